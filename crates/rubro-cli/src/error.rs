//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] rubro_pipeline::PipelineError),

    /// Result store error
    #[error("Store error: {0}")]
    Store(#[from] rubro_store::StoreError),

    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(#[from] rubro_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The run was interrupted
    #[error("Interrupted; results of finished batches were kept")]
    Interrupted,
}
