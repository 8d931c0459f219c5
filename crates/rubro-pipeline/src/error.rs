//! Error types for the pipeline

use thiserror::Error;

/// Errors raised while choosing documents to sample
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    /// Unknown sampling method or unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors that can occur in the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sampling error
    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    /// Fault inside one entity; the batch continues
    #[error("Entity {rut} failed: {reason}")]
    Entity {
        /// Entity identifier
        rut: String,
        /// What went wrong
        reason: String,
    },

    /// Result store error
    #[error("Store error: {0}")]
    Store(String),

    /// Input file could not be read
    #[error("Input error: {0}")]
    Input(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::JsonParse(e.to_string())
    }
}
