//! Configuration loading and command-line overrides.

use crate::cli::{ConfigOverrides, ProviderArg, RunArgs};
use crate::error::{CliError, Result};
use rubro_llm::ProviderConfig;
use rubro_pipeline::{PipelineConfig, SamplingMethod};
use std::path::Path;

/// Load the pipeline configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
    let config: PipelineConfig = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

impl ConfigOverrides {
    /// Apply the flags that were given.
    ///
    /// A provider preset replaces the whole provider block; endpoint and
    /// credential flags are applied after it.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(outer) = self.outer_workers {
            config.outer_workers = outer;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(provider) = self.provider {
            config.provider = match provider {
                ProviderArg::Deepseek => ProviderConfig::deepseek(),
                ProviderArg::Openai => ProviderConfig::openai(),
                ProviderArg::Ollama => ProviderConfig::ollama(),
            };
        }
        if let Some(base_url) = &self.base_url {
            config.provider.base_url = base_url.clone();
        }
        if let Some(var) = &self.api_key_env {
            config.provider.api_key_env = Some(var.clone());
        }
        if let Some(key) = &self.api_key {
            config.provider.api_key = Some(key.clone());
        }
        if let Some(dir) = &self.completion_dir {
            config.completion_dir = dir.clone();
        }
        if let Some(dir) = &self.classification_dir {
            config.classification_dir = dir.clone();
        }
    }
}

impl RunArgs {
    /// Apply the run flags, then the shared overrides.
    pub fn apply(&self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(max_docs) = self.max_docs {
            config.max_docs = max_docs;
        }
        if let Some(inner) = self.inner_workers {
            config.inner_workers = inner;
        }
        if let Some(method) = &self.sampling {
            config.sampling_method = method
                .parse::<SamplingMethod>()
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        self.overrides.apply(config);
        Ok(())
    }
}
