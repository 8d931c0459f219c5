//! Ollama Provider Implementation
//!
//! Talks to a local Ollama daemon through `POST {base}/api/chat` with
//! streaming disabled.
//!
//! # Examples
//!
//! ```no_run
//! use rubro_llm::{OllamaOptions, OllamaProvider};
//! use std::time::Duration;
//!
//! let provider = OllamaProvider::new(
//!     "http://localhost:11434",
//!     OllamaOptions::default(),
//!     Duration::from_secs(10),
//! )
//! .unwrap();
//! ```

use crate::config::{OllamaOptions, ProviderConfig, ProviderContract};
use crate::envelope::ResponseEnvelope;
use crate::openai::{build_client, status_error, WireMessage};
use crate::provider::{ChatProvider, ChatRequest};
use crate::LlmError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    options: OllamaOptions,
    client: reqwest::Client,
}

/// Completion requests carry the sampling knobs; JSON requests only the
/// temperature and their own context window.
#[derive(Serialize)]
struct WireOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f64>,
    num_ctx: u32,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 1],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: WireOptions,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(
        endpoint: impl Into<String>,
        options: OllamaOptions,
        connect_timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            options,
            client: build_client(connect_timeout)?,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate()?;
        Self::new(
            config.trimmed_base_url(),
            config.ollama.clone(),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    fn body<'a>(&self, request: &'a ChatRequest) -> OllamaChatRequest<'a> {
        let options = if request.json_output {
            WireOptions {
                temperature: request.temperature,
                top_p: None,
                repeat_penalty: None,
                num_ctx: self.options.classification_num_ctx,
            }
        } else {
            WireOptions {
                temperature: request.temperature,
                top_p: Some(self.options.top_p),
                repeat_penalty: Some(self.options.repeat_penalty),
                num_ctx: self.options.num_ctx,
            }
        };
        OllamaChatRequest {
            model: &request.model,
            messages: [WireMessage {
                role: "user",
                content: &request.prompt,
            }],
            stream: false,
            format: request.json_output.then_some("json"),
            options,
        }
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text, &request.model));
        }

        ResponseEnvelope::decode(ProviderContract::Ollama, &text)?.into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OllamaProvider {
        OllamaProvider::new(
            "http://localhost:11434/",
            OllamaOptions::default(),
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        assert_eq!(provider().endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_body_plain_text() {
        let request = ChatRequest::new("qwen", "hola", 0.2);
        let value = serde_json::to_value(provider().body(&request)).unwrap();
        assert_eq!(value["stream"], false);
        assert!(value.get("format").is_none());
        assert_eq!(value["options"]["temperature"], 0.2);
        assert_eq!(value["options"]["top_p"], 1.0);
        assert_eq!(value["options"]["repeat_penalty"], 1.1);
        assert_eq!(value["options"]["num_ctx"], 4200);
    }

    #[test]
    fn test_body_json_format() {
        let request = ChatRequest::new("qwen", "hola", 0.0).with_json_output();
        let value = serde_json::to_value(provider().body(&request)).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["messages"][0]["content"], "hola");
        assert_eq!(value["options"]["temperature"], 0.0);
        assert_eq!(value["options"]["num_ctx"], 5000);
        assert!(value["options"].get("top_p").is_none());
        assert!(value["options"].get("repeat_penalty").is_none());
    }
}
