//! LLM completion clients for Gemini, Anthropic, and OpenAI-compatible APIs.
//!
//! Every client sends one fully formatted prompt as a single user message and
//! returns the text of the first candidate:
//!
//! - [`UnifiedLlmClient`] — Recommended: picks the provider from the model name
//! - [`GeminiClient`] — Google Generative Language API (`generateContent`)
//! - [`AnthropicClient`] — Claude models via the Messages API
//! - [`LlmClient`] — OpenAI-compatible chat completions
//!
//! All of them implement [`CompletionModel`], which is the seam the
//! recommendation pipeline depends on.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rujuk_config::TriageConfig;
//! use rujuk_llm::{CompletionModel, UnifiedLlmClient};
//!
//! let config = TriageConfig::from_env()?;
//! let client = UnifiedLlmClient::from_config(&config)?;
//! let response = client.complete("Answer with one word: hello?").await?;
//! println!("{}", response.content);
//! ```

mod anthropic;
mod client;
mod completion;
mod gemini;
mod unified;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use completion::{CompletionModel, LlmMetrics, LlmResponse};
pub use gemini::GeminiClient;
pub use unified::UnifiedLlmClient;

use rujuk_core::TriageError;

const USER_AGENT: &str = concat!("rujuk/", env!("CARGO_PKG_VERSION"));

/// Converts any error into a TriageError::Llm.
pub(crate) fn llm_err(e: impl ToString) -> TriageError {
    TriageError::Llm(e.to_string())
}

/// Builds the shared reqwest client used by the HTTP-based providers.
pub(crate) fn http_client() -> Result<reqwest::Client, TriageError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(llm_err)
}
