//! Provider abstraction
//!
//! A provider sends one prompt to one chat endpoint and returns the raw
//! assistant text. Scheduling, permits and error collapsing live in
//! [`crate::caller`].

use crate::config::{ProviderConfig, ProviderContract};
use crate::{LlmError, OllamaProvider, OpenAiCompatProvider};
use async_trait::async_trait;
use std::sync::Arc;

/// One single-turn chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Target model identifier
    pub model: String,

    /// The user message
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Ask the endpoint for a JSON-formatted answer (Ollama `format: "json"`)
    pub json_output: bool,
}

impl ChatRequest {
    /// Create a plain-text request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature,
            json_output: false,
        }
    }

    /// Request a JSON-formatted answer
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// A chat-completion endpoint
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name, used in logs
    fn name(&self) -> &str;

    /// Send the request and return the assistant message content
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Build the provider selected by `config.contract`
///
/// Fails when the configuration cannot produce a working client, e.g. an
/// OpenAI-compatible contract without an API key.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ChatProvider>, LlmError> {
    let provider: Arc<dyn ChatProvider> = match config.contract {
        ProviderContract::OpenAiCompat => Arc::new(OpenAiCompatProvider::from_config(config)?),
        ProviderContract::Ollama => Arc::new(OllamaProvider::from_config(config)?),
    };
    tracing::debug!(provider = provider.name(), base_url = %config.base_url, "Built LLM provider");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("m", "p", 0.5);
        assert!(!request.json_output);
        assert!(request.with_json_output().json_output);
    }

    #[test]
    fn test_build_ollama_provider() {
        let provider = build_provider(&ProviderConfig::ollama()).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_build_openai_without_key_fails() {
        let mut config = ProviderConfig::openai();
        config.api_key = None;
        config.api_key_env = Some("RUBRO_TEST_UNSET_KEY_VARIABLE".to_string());
        let result = build_provider(&config);
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }

    #[test]
    fn test_build_openai_with_explicit_key() {
        let mut config = ProviderConfig::deepseek();
        config.api_key = Some("sk-test".to_string());
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai_compat");
    }
}
