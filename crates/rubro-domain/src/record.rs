//! Per-entity aggregates produced by the pipeline

use crate::{Document, Rut};

/// Rubro value meaning "classification failed" (call or extraction error)
///
/// Callers must treat it as a failure marker, never as an economic sector.
pub const SENTINEL_API_ERROR: &str = "API_ERROR";

/// Rubro value used when the model answered JSON without a rubro list
pub const SENTINEL_UNKNOWN_RUBRO: &str = "UNKNOWN_RUBRO";

/// Cleaned completions for one entity
///
/// Created once the sampler produced a non-empty sample. Recipient-side
/// completions are not generated yet; the field is kept and stays empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    /// Entity identifier
    pub rut: Rut,

    /// Rubros declared in the historical registry, if any
    pub declared_rubros: Option<Vec<String>>,

    /// Issuer documents that were sampled for processing
    pub emisor_documents: Vec<Document>,

    /// Recipient documents of the entity
    pub receptor_documents: Vec<Document>,

    /// Sanitized completions of the issuer documents
    pub emisor_completions: Vec<String>,

    /// Sanitized completions of the recipient documents (always empty)
    pub receptor_completions: Vec<String>,
}

impl CompletionRecord {
    /// Create a record with no completions yet
    pub fn new(
        rut: Rut,
        declared_rubros: Option<Vec<String>>,
        emisor_documents: Vec<Document>,
        receptor_documents: Vec<Document>,
    ) -> Self {
        Self {
            rut,
            declared_rubros,
            emisor_documents,
            receptor_documents,
            emisor_completions: Vec::new(),
            receptor_completions: Vec::new(),
        }
    }

    /// Whether at least one completion survived
    pub fn has_completions(&self) -> bool {
        !self.emisor_completions.is_empty() || !self.receptor_completions.is_empty()
    }
}

/// A completion record plus the assigned rubros
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// The record the classification was computed from
    pub record: CompletionRecord,

    /// Assigned rubros, or a single sentinel value
    pub rubros: Vec<String>,

    /// Model justification or failure description
    pub justification: String,
}

impl ClassificationResult {
    /// Build the sentinel result for a failed classification
    pub fn failed(record: CompletionRecord, justification: impl Into<String>) -> Self {
        Self {
            record,
            rubros: vec![SENTINEL_API_ERROR.to_string()],
            justification: justification.into(),
        }
    }

    /// Whether this result carries the API_ERROR sentinel
    pub fn is_failed(&self) -> bool {
        self.rubros.len() == 1 && self.rubros[0] == SENTINEL_API_ERROR
    }

    /// Entity identifier
    pub fn rut(&self) -> &Rut {
        &self.record.rut
    }
}
