//! The completion contract shared by all providers.

use async_trait::async_trait;
use rujuk_core::TriageError;

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// Complete response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw text returned by the model, untrimmed.
    pub content: String,
    pub metrics: LlmMetrics,
}

impl LlmResponse {
    /// Wraps text with empty metrics.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metrics: LlmMetrics::default(),
        }
    }
}

/// A text-completion backend: one prompt in, free-form text out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Sends a single-turn prompt and returns the model's raw reply.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, TriageError>;
}
