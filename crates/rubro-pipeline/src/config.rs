//! Configuration for the pipeline

use crate::sampler::SamplingMethod;
use rubro_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a run produces per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Completions followed by one classification call
    #[default]
    Full,
    /// Completions only
    CompleteOnly,
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model used for both completion and classification calls
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Concurrent completion calls within one entity
    #[serde(default = "default_inner_workers")]
    pub inner_workers: usize,

    /// Entities processed concurrently within a batch
    #[serde(default = "default_outer_workers")]
    pub outer_workers: usize,

    /// Entities per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum issuer documents sampled per entity
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    /// Sampling policy (`aleatorio`, `recientes`, `antiguos`, `estratificado`)
    #[serde(default)]
    pub sampling_method: SamplingMethod,

    /// Seed for the sampling RNG; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Directory of completion records
    #[serde(default = "default_completion_dir")]
    pub completion_dir: PathBuf,

    /// Directory of classification results
    #[serde(default = "default_classification_dir")]
    pub classification_dir: PathBuf,

    /// LLM endpoint
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_model() -> String {
    "deepseek-reasoner".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_inner_workers() -> usize {
    4
}

fn default_outer_workers() -> usize {
    2
}

fn default_batch_size() -> usize {
    500
}

fn default_max_docs() -> usize {
    5
}

fn default_completion_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_classification_dir() -> PathBuf {
    PathBuf::from("results_clas")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            inner_workers: default_inner_workers(),
            outer_workers: default_outer_workers(),
            batch_size: default_batch_size(),
            max_docs: default_max_docs(),
            sampling_method: SamplingMethod::default(),
            seed: None,
            completion_dir: default_completion_dir(),
            classification_dir: default_classification_dir(),
            provider: ProviderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Local preset: Ollama endpoint with a local reasoning model
    pub fn local() -> Self {
        Self {
            model: "deepseek-r1:32b".to_string(),
            provider: ProviderConfig::ollama(),
            ..Self::default()
        }
    }

    /// Upper bound of requests in flight at steady state
    pub fn max_in_flight(&self) -> usize {
        self.outer_workers * self.inner_workers
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            ));
        }
        if self.inner_workers == 0 {
            return Err("inner_workers must be greater than 0".to_string());
        }
        if self.outer_workers == 0 {
            return Err("outer_workers must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.max_docs == 0 {
            return Err("max_docs must be greater than 0".to_string());
        }
        if self.completion_dir.as_os_str().is_empty() || self.classification_dir.as_os_str().is_empty() {
            return Err("output directories must not be empty".to_string());
        }
        self.provider.validate().map_err(|e| e.to_string())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rubro_llm::ProviderContract;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.max_in_flight(), 8);
        assert_eq!(config.sampling_method, SamplingMethod::Random);
    }

    #[test]
    fn test_local_config_is_valid() {
        let config = PipelineConfig::local();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.contract, ProviderContract::Ollama);
    }

    #[test]
    fn test_zero_caps_are_rejected() {
        let mut config = PipelineConfig::default();
        config.inner_workers = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = PipelineConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            max_docs = 2
            sampling_method = "recientes"

            [provider]
            contract = "ollama"
            base_url = "http://localhost:11434"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_docs, 2);
        assert_eq!(config.sampling_method, SamplingMethod::MostRecent);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.provider.contract, ProviderContract::Ollama);
    }

    #[test]
    fn test_unknown_sampling_method_fails_to_load() {
        let err = PipelineConfig::from_toml(r#"sampling_method = "semanal""#).unwrap_err();
        assert!(err.contains("semanal"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.model, parsed.model);
        assert_eq!(config.inner_workers, parsed.inner_workers);
        assert_eq!(config.sampling_method, parsed.sampling_method);
        assert_eq!(config.provider.base_url, parsed.provider.base_url);
    }
}
