//! Unified LLM client that routes to the appropriate provider based on model name.

use async_trait::async_trait;
use rujuk_config::{Provider, TriageConfig};
use rujuk_core::TriageError;

use crate::anthropic::AnthropicClient;
use crate::client::LlmClient;
use crate::gemini::GeminiClient;
use crate::{CompletionModel, LlmResponse};

enum Backend {
    Gemini(GeminiClient),
    Anthropic(AnthropicClient),
    OpenAi(LlmClient),
}

/// Unified client that routes requests to Gemini, Anthropic or OpenAI based on model name.
///
/// The provider client is built once and reused for every request.
pub struct UnifiedLlmClient {
    provider: Provider,
    backend: Backend,
}

impl std::fmt::Debug for UnifiedLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedLlmClient")
            .field("provider", &self.provider)
            .field("model", &self.name())
            .finish()
    }
}

impl UnifiedLlmClient {
    /// Creates a client for `model`, detecting the provider from its name.
    ///
    /// Fails when the credential is missing or blank, or when the HTTP
    /// client cannot be built.
    pub fn new(model: &str, api_key: Option<&str>, api_base: Option<&str>) -> Result<Self, TriageError> {
        let provider = Provider::from_model(model);
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TriageError::Llm(format!(
                    "{} not found in environment variables. Please create a .env file.",
                    provider.api_key_var()
                ))
            })?;

        let backend = match provider {
            Provider::Gemini => Backend::Gemini(GeminiClient::new(model, api_key, api_base)?),
            Provider::Anthropic => Backend::Anthropic(AnthropicClient::new(model, api_key, api_base)?),
            Provider::OpenAi => Backend::OpenAi(LlmClient::new(model, api_key, api_base)),
        };

        Ok(Self { provider, backend })
    }

    /// Creates a client from the service configuration.
    pub fn from_config(config: &TriageConfig) -> Result<Self, TriageError> {
        Self::new(&config.model, config.api_key.as_deref(), config.api_base.as_deref())
    }

    /// Provider this client talks to.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn inner(&self) -> &dyn CompletionModel {
        match &self.backend {
            Backend::Gemini(c) => c,
            Backend::Anthropic(c) => c,
            Backend::OpenAi(c) => c,
        }
    }
}

#[async_trait]
impl CompletionModel for UnifiedLlmClient {
    fn name(&self) -> &str {
        self.inner().name()
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse, TriageError> {
        self.inner().complete(prompt).await
    }
}
