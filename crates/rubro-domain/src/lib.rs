//! Rubro Domain Layer
//!
//! Core domain model for classifying the economic activity ("rubro") of
//! tax-identifier entities (RUTs). This crate only depends on `uuid` and
//! defines the value objects and trait interfaces that the pipeline, the
//! LLM layer and the storage layer share.
//!
//! ## Key Concepts
//!
//! - **Rut**: the entity identifier, the partition key for all per-entity state
//! - **Document**: one flattened transaction record, tagged as emisor or receptor
//! - **CompletionRecord**: the cleaned LLM completions for one entity
//! - **ClassificationResult**: a completion record plus the assigned rubros
//! - **RunId**: UUIDv7 identifying one pipeline run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod record;
pub mod run;
pub mod rut;
pub mod traits;

// Re-exports for convenience
pub use document::{Document, DocumentRole, EntityDocuments};
pub use record::{
    ClassificationResult, CompletionRecord, SENTINEL_API_ERROR, SENTINEL_UNKNOWN_RUBRO,
};
pub use run::RunId;
pub use rut::Rut;
pub use traits::ResultStore;

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStore;

    impl ResultStore for NullStore {
        type Error = std::convert::Infallible;

        fn save_completion(&self, _record: &CompletionRecord) -> Result<(), Self::Error> {
            Ok(())
        }

        fn save_classification(&self, _result: &ClassificationResult) -> Result<(), Self::Error> {
            Ok(())
        }

        fn load_completion(&self, _rut: &Rut) -> Result<Option<CompletionRecord>, Self::Error> {
            Ok(None)
        }

        fn load_classification(
            &self,
            _rut: &Rut,
        ) -> Result<Option<ClassificationResult>, Self::Error> {
            Ok(None)
        }
    }

    #[test]
    fn test_result_store_is_reexported() {
        let store: &dyn ResultStore<Error = std::convert::Infallible> = &NullStore;
        assert_eq!(store.load_completion(&Rut::new("1-9")), Ok(None));
    }
}
