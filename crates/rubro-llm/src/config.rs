//! Provider configuration
//!
//! Presets mirror the two supported wire contracts: DeepSeek/OpenAI style
//! chat completions and a local Ollama daemon.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default DeepSeek base URL
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Default OpenAI base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Ollama endpoint
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Environment variable overriding the Ollama endpoint
pub const OLLAMA_URL_ENV: &str = "OLLAMA_URL";

/// Connect timeout applied to every client
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Wire contract spoken by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderContract {
    /// `POST {base}/chat/completions`, bearer auth, answer at `choices[0].message.content`
    OpenAiCompat,
    /// `POST {base}/api/chat`, no auth, answer at `message.content`
    Ollama,
}

impl ProviderContract {
    /// Convert to config string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderContract::OpenAiCompat => "openai_compat",
            ProviderContract::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai_compat" | "openai" | "deepseek" => Ok(ProviderContract::OpenAiCompat),
            "ollama" => Ok(ProviderContract::Ollama),
            other => Err(format!("Unknown provider contract: {}", other)),
        }
    }
}

/// Generation options sent to Ollama
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaOptions {
    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Repetition penalty
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f64,

    /// Context window size
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Context window of JSON classification requests
    #[serde(default = "default_classification_num_ctx")]
    pub classification_num_ctx: u32,
}

fn default_top_p() -> f64 {
    1.0
}

fn default_repeat_penalty() -> f64 {
    1.1
}

fn default_num_ctx() -> u32 {
    4200
}

fn default_classification_num_ctx() -> u32 {
    5000
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            top_p: default_top_p(),
            repeat_penalty: default_repeat_penalty(),
            num_ctx: default_num_ctx(),
            classification_num_ctx: default_classification_num_ctx(),
        }
    }
}

/// Configuration of the LLM endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Wire contract
    pub contract: ProviderContract,

    /// Base URL, without trailing path
    pub base_url: String,

    /// Literal API key (prefer `api_key_env`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Connect timeout in seconds; there is no total request timeout
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Ollama generation options (ignored by other contracts)
    #[serde(default)]
    pub ollama: OllamaOptions,
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl ProviderConfig {
    /// DeepSeek preset, key read from `DEEP_API_KEY`
    pub fn deepseek() -> Self {
        Self {
            contract: ProviderContract::OpenAiCompat,
            base_url: DEEPSEEK_BASE_URL.to_string(),
            api_key: None,
            api_key_env: Some("DEEP_API_KEY".to_string()),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            ollama: OllamaOptions::default(),
        }
    }

    /// OpenAI preset, key read from `OPENAI_API_KEY`
    pub fn openai() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            ..Self::deepseek()
        }
    }

    /// Local Ollama preset, endpoint overridable through `OLLAMA_URL`
    pub fn ollama() -> Self {
        let base_url = std::env::var(OLLAMA_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| OLLAMA_BASE_URL.to_string());
        Self {
            contract: ProviderContract::Ollama,
            base_url,
            api_key: None,
            api_key_env: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            ollama: OllamaOptions::default(),
        }
    }

    /// Base URL without a trailing slash
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Resolve the API key: literal value first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.base_url.trim().is_empty() {
            return Err(LlmError::NotConfigured("base_url is empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LlmError::NotConfigured(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.connect_timeout_secs == 0 {
            return Err(LlmError::NotConfigured(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::deepseek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let deepseek = ProviderConfig::default();
        assert_eq!(deepseek.contract, ProviderContract::OpenAiCompat);
        assert_eq!(deepseek.base_url, DEEPSEEK_BASE_URL);

        let ollama = ProviderConfig::ollama();
        assert_eq!(ollama.contract, ProviderContract::Ollama);
        assert_eq!(ollama.ollama.num_ctx, 4200);
        assert_eq!(ollama.ollama.repeat_penalty, 1.1);
        assert!(ollama.validate().is_ok());
    }

    #[test]
    fn test_contract_from_str() {
        assert_eq!("ollama".parse::<ProviderContract>(), Ok(ProviderContract::Ollama));
        assert_eq!("DeepSeek".parse::<ProviderContract>(), Ok(ProviderContract::OpenAiCompat));
        assert!("grpc".parse::<ProviderContract>().is_err());
    }

    #[test]
    fn test_explicit_key_wins() {
        let mut config = ProviderConfig::openai();
        config.api_key = Some("sk-literal".to_string());
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-literal"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = ProviderConfig::ollama();
        config.base_url = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trimmed_base_url() {
        let mut config = ProviderConfig::ollama();
        config.base_url = "http://host:1/".to_string();
        assert_eq!(config.trimmed_base_url(), "http://host:1");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"contract": "ollama", "base_url": "http://localhost:11434"}"#,
        )
        .unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.ollama, OllamaOptions::default());
        assert_eq!(config.ollama.classification_num_ctx, 5000);
    }
}
