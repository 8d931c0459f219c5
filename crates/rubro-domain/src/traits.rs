//! Trait definitions for external interactions
//!
//! Infrastructure implementations live in other crates.

use crate::{ClassificationResult, CompletionRecord, Rut};

/// Durable per-entity result storage
///
/// Implemented by the infrastructure layer (rubro-store). Every save fully
/// replaces the previous record for the same RUT.
pub trait ResultStore {
    /// Error type for store operations
    type Error;

    /// Persist the completion record of one entity
    fn save_completion(&self, record: &CompletionRecord) -> Result<(), Self::Error>;

    /// Persist the classification result of one entity
    fn save_classification(&self, result: &ClassificationResult) -> Result<(), Self::Error>;

    /// Load a previously persisted completion record
    fn load_completion(&self, rut: &Rut) -> Result<Option<CompletionRecord>, Self::Error>;

    /// Load a previously persisted classification result
    fn load_classification(&self, rut: &Rut) -> Result<Option<ClassificationResult>, Self::Error>;
}
