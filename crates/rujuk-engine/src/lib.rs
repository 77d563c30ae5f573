//! Department recommendation pipeline.
//!
//! - [`Recommender`] — Turns a [`PatientRecord`] into a [`RecommendationResult`]
//! - [`PipelineStatus`] — Whether the LLM client came up at startup
//! - [`prompt`] — The fixed triage instruction template
//!
//! # Execution Model
//!
//! One request is one LLM round trip:
//!
//! 1. Join the symptoms with `", "` and fill the template
//! 2. Send the prompt as a single-turn completion
//! 3. Trim the reply and return it verbatim as the department
//!
//! There are no retries and the reply is not checked against the department
//! catalog. A recommender whose client failed to initialize stays disabled for
//! the life of the process and answers every call with
//! [`TriageError::NotInitialized`] without touching the network.
//!
//! ```rust,ignore
//! use rujuk_config::TriageConfig;
//! use rujuk_engine::Recommender;
//!
//! let recommender = Recommender::from_config(&TriageConfig::from_env()?);
//! let result = recommender.recommend(&record).await?;
//! println!("{}", result.recommended_department);
//! ```

pub mod prompt;

use std::sync::Arc;

use rujuk_config::{InputLimits, TriageConfig};
use rujuk_core::{PatientRecord, RecommendationResult, TriageError};
use rujuk_llm::{CompletionModel, UnifiedLlmClient};
use tracing::{debug, error, info};

/// Startup outcome of the LLM client.
#[derive(Clone)]
pub enum PipelineStatus {
    /// The client is ready to serve requests.
    Enabled(Arc<dyn CompletionModel>),
    /// Initialization failed; `reason` is the startup error.
    Disabled { reason: String },
}

/// Read-only recommendation service shared by all requests.
#[derive(Clone)]
pub struct Recommender {
    status: PipelineStatus,
    limits: InputLimits,
}

impl Recommender {
    /// Creates an enabled recommender around an existing model.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            status: PipelineStatus::Enabled(model),
            limits: InputLimits::default(),
        }
    }

    /// Creates a recommender that refuses every request.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Disabled { reason: reason.into() },
            limits: InputLimits::default(),
        }
    }

    /// Builds the LLM client from configuration.
    ///
    /// Never fails: a missing credential or client error yields a disabled
    /// recommender and is logged once here.
    pub fn from_config(config: &TriageConfig) -> Self {
        let recommender = match UnifiedLlmClient::from_config(config) {
            Ok(client) => {
                info!(
                    "LLM client ready: provider={}, model={}",
                    client.provider(),
                    config.model
                );
                Self::new(Arc::new(client))
            }
            Err(e) => {
                error!("Error during LLM setup: {}", e);
                Self::disabled(e.to_string())
            }
        };
        recommender.with_limits(config.limits)
    }

    /// Sets the input limits applied before each LLM call.
    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Startup outcome, including the reason a disabled pipeline failed.
    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    /// Checks a record against the configured input limits.
    pub fn validate(&self, record: &PatientRecord) -> Result<(), TriageError> {
        self.limits.check(record)
    }

    /// Recommends a department for one patient.
    pub async fn recommend(&self, record: &PatientRecord) -> Result<RecommendationResult, TriageError> {
        self.validate(record)?;
        let model = match &self.status {
            PipelineStatus::Enabled(model) => model,
            PipelineStatus::Disabled { .. } => return Err(TriageError::NotInitialized),
        };

        let prompt = prompt::build_prompt(record);
        debug!("Triage prompt:\n{}", prompt);

        let response = model.complete(&prompt).await?;
        let result = RecommendationResult::from_raw(&response.content);
        if result.department().is_none() {
            debug!(
                "Recommendation '{}' is outside the department catalog",
                result.recommended_department
            );
        }

        info!(
            "Recommended '{}' via {}: {}ms, tokens: {}/{} (in/out)",
            result.recommended_department,
            model.name(),
            response.metrics.elapsed_ms,
            response.metrics.input_tokens,
            response.metrics.output_tokens
        );

        Ok(result)
    }
}
