//! OpenAI-compatible provider (DeepSeek, OpenAI)
//!
//! Speaks `POST {base}/chat/completions` with a bearer token and a single
//! user message.

use crate::config::{ProviderConfig, ProviderContract};
use crate::envelope::ResponseEnvelope;
use crate::provider::{ChatProvider, ChatRequest};
use crate::LlmError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Longest error body kept in an [`LlmError::Status`]
pub(crate) const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 1],
    temperature: f64,
}

/// Provider for OpenAI-style chat-completions endpoints
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider for `base_url` authenticated with `api_key`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(connect_timeout)?,
        })
    }

    /// Create a provider from configuration, resolving the API key
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let api_key = config.resolve_api_key().ok_or_else(|| {
            LlmError::NotConfigured(format!(
                "no API key for {} (set {})",
                config.base_url,
                config.api_key_env.as_deref().unwrap_or("api_key")
            ))
        })?;
        Self::new(
            config.trimmed_base_url(),
            api_key,
            Duration::from_secs(config.connect_timeout_secs),
        )
    }
}

/// Build a client with a connect timeout and no total timeout
pub(crate) fn build_client(connect_timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| LlmError::NotConfigured(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-2xx answer into an error
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str, model: &str) -> LlmError {
    if status == reqwest::StatusCode::NOT_FOUND {
        return LlmError::ModelNotAvailable(model.to_string());
    }
    let mut body = body.trim().to_string();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    LlmError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: [WireMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text, &request.model));
        }

        ResponseEnvelope::decode(ProviderContract::OpenAiCompat, &text)?.into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "deepseek-reasoner",
            messages: [WireMessage {
                role: "user",
                content: "hola",
            }],
            temperature: 0.1,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "deepseek-reasoner");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hola");
        assert_eq!(value["temperature"], 0.1);
    }

    #[test]
    fn test_status_error_truncates_body() {
        let long = "x".repeat(2000);
        match status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &long, "m") {
            LlmError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_means_model_missing() {
        let err = status_error(reqwest::StatusCode::NOT_FOUND, "", "gpt-x");
        assert!(matches!(err, LlmError::ModelNotAvailable(m) if m == "gpt-x"));
    }
}
