//! Service configuration read from the process environment.
//!
//! - [`TriageConfig`] — Model, credential, listen address and input limits
//! - [`Provider`] — LLM provider selected from the model name
//! - [`InputLimits`] — Optional bounds on the symptom list
//!
//! ```rust
//! use rujuk_config::{Provider, TriageConfig};
//!
//! let config = TriageConfig::from_lookup(|key| match key {
//!     "GOOGLE_API_KEY" => Some("secret".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.model, "gemini-1.5-flash");
//! assert_eq!(config.provider(), Provider::Gemini);
//! assert!(config.api_key.is_some());
//! ```

use std::fmt;
use std::net::SocketAddr;

use rujuk_core::{PatientRecord, TriageError};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

const MODEL_VAR: &str = "LLM_MODEL";
const API_BASE_VAR: &str = "LLM_API_BASE";
const BIND_ADDR_VAR: &str = "BIND_ADDR";
const MAX_SYMPTOMS_VAR: &str = "RUJUK_MAX_SYMPTOMS";
const MAX_SYMPTOM_CHARS_VAR: &str = "RUJUK_MAX_SYMPTOM_CHARS";

/// Errors that can occur when reading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The listen address does not parse as `host:port`.
    #[error("Invalid bind address '{addr}': {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// LLM provider, determined from the model name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (`gemini-*`).
    Gemini,
    /// Anthropic Claude (`claude-*`).
    Anthropic,
    /// Any OpenAI-compatible endpoint (everything else).
    OpenAi,
}

impl Provider {
    /// Detects the provider from a model name.
    pub fn from_model(model: &str) -> Self {
        if model.starts_with("gemini-") {
            Self::Gemini
        } else if model.starts_with("claude-") {
            Self::Anthropic
        } else {
            Self::OpenAi
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        };
        write!(f, "{}", s)
    }
}

/// Optional bounds on the symptom list. Both are off unless configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLimits {
    /// Maximum number of symptoms per request.
    pub max_symptoms: Option<usize>,
    /// Maximum characters in a single symptom.
    pub max_symptom_chars: Option<usize>,
}

impl InputLimits {
    /// Returns `true` if no limit is configured.
    pub fn is_unbounded(&self) -> bool {
        self.max_symptoms.is_none() && self.max_symptom_chars.is_none()
    }

    /// Checks a record against the configured limits.
    pub fn check(&self, record: &PatientRecord) -> Result<(), TriageError> {
        if let Some(max) = self.max_symptoms {
            if record.symptoms.len() > max {
                return Err(TriageError::InvalidInput(format!(
                    "too many symptoms: {} given, at most {} allowed",
                    record.symptoms.len(),
                    max
                )));
            }
        }

        let Some(max_chars) = self.max_symptom_chars else {
            return Ok(());
        };
        match record
            .symptoms
            .iter()
            .position(|s| s.chars().count() > max_chars)
        {
            Some(idx) => Err(TriageError::InvalidInput(format!(
                "symptom {} exceeds {} characters",
                idx, max_chars
            ))),
            None => Ok(()),
        }
    }
}

/// Complete service configuration.
#[derive(Clone)]
pub struct TriageConfig {
    /// Model name passed to the provider.
    pub model: String,
    /// Credential for the selected provider. `None` disables the pipeline.
    pub api_key: Option<String>,
    /// Override for the provider base URL.
    pub api_base: Option<String>,
    /// Listen address for the HTTP server.
    pub bind_addr: SocketAddr,
    pub limits: InputLimits,
}

impl fmt::Debug for TriageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriageConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("bind_addr", &self.bind_addr)
            .field("limits", &self.limits)
            .finish()
    }
}

impl TriageConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model = get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_key = get(Provider::from_model(&model).api_key_var());
        let api_base = get(API_BASE_VAR).map(|b| b.trim_end_matches('/').to_string());

        let addr = get(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { addr, source })?;

        let limits = InputLimits {
            max_symptoms: parse_limit(MAX_SYMPTOMS_VAR, get(MAX_SYMPTOMS_VAR))?,
            max_symptom_chars: parse_limit(MAX_SYMPTOM_CHARS_VAR, get(MAX_SYMPTOM_CHARS_VAR))?,
        };

        Ok(Self {
            model,
            api_key,
            api_base,
            bind_addr,
            limits,
        })
    }

    /// Provider selected by the configured model.
    pub fn provider(&self) -> Provider {
        Provider::from_model(&self.model)
    }
}

fn parse_limit(key: &'static str, value: Option<String>) -> Result<Option<usize>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}
