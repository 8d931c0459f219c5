//! Core types for the pipeline

use rubro_domain::{ClassificationResult, CompletionRecord, Document, EntityDocuments, Rut};
use std::fmt;

/// One entity to process
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInput {
    /// Entity identifier
    pub rut: Rut,

    /// Documents of the entity, split by role
    pub documents: EntityDocuments,

    /// Rubros declared in the historical registry, if any
    pub declared_rubros: Option<Vec<String>>,
}

impl EntityInput {
    /// Create an input without declared rubros
    pub fn new(rut: Rut, documents: EntityDocuments) -> Self {
        Self {
            rut,
            documents,
            declared_rubros: None,
        }
    }

    /// Attach declared rubros
    pub fn with_declared_rubros(mut self, rubros: Vec<String>) -> Self {
        self.declared_rubros = Some(rubros);
        self
    }
}

/// An entity whose issuer documents have been sampled
#[derive(Debug, Clone, PartialEq)]
pub struct SampledEntity {
    /// Entity identifier
    pub rut: Rut,

    /// Rubros declared in the historical registry, if any
    pub declared_rubros: Option<Vec<String>>,

    /// Sampled issuer documents (never empty)
    pub sample: Vec<Document>,

    /// Recipient documents, carried through to the record
    pub receptor: Vec<Document>,
}

impl SampledEntity {
    /// The completion record before any call was made
    pub fn base_record(&self) -> CompletionRecord {
        CompletionRecord::new(
            self.rut.clone(),
            self.declared_rubros.clone(),
            self.sample.clone(),
            self.receptor.clone(),
        )
    }
}

/// Terminal state of one entity in a run
#[derive(Debug, Clone, PartialEq)]
pub enum EntityOutcome {
    /// Empty sample; nothing is written
    Skipped {
        /// Entity identifier
        rut: Rut,
    },

    /// Completions produced, no classification requested
    Completed(CompletionRecord),

    /// Classification finished, possibly with the API_ERROR sentinel
    Classified(ClassificationResult),

    /// Unexpected fault caught at the worker boundary
    Failed {
        /// Entity identifier
        rut: Rut,
        /// Record to persist next to the sentinel, when one exists
        record: Option<CompletionRecord>,
        /// What went wrong
        reason: String,
    },
}

impl EntityOutcome {
    /// Entity identifier
    pub fn rut(&self) -> &Rut {
        match self {
            EntityOutcome::Skipped { rut } | EntityOutcome::Failed { rut, .. } => rut,
            EntityOutcome::Completed(record) => &record.rut,
            EntityOutcome::Classified(result) => result.rut(),
        }
    }

    /// Coarse status, used for progress and metrics
    pub fn status(&self) -> EntityStatus {
        match self {
            EntityOutcome::Skipped { .. } => EntityStatus::Skipped,
            EntityOutcome::Completed(_) => EntityStatus::Completed,
            EntityOutcome::Classified(result) if result.is_failed() => EntityStatus::Sentinel,
            EntityOutcome::Classified(_) => EntityStatus::Classified,
            EntityOutcome::Failed { .. } => EntityStatus::Failed,
        }
    }
}

/// Coarse entity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityStatus {
    /// Nothing to process
    Skipped,
    /// Completions written
    Completed,
    /// Classified with real rubros
    Classified,
    /// Classified with the API_ERROR sentinel
    Sentinel,
    /// Fault caught at the worker boundary
    Failed,
}

impl EntityStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Skipped => "skipped",
            EntityStatus::Completed => "completed",
            EntityStatus::Classified => "classified",
            EntityStatus::Sentinel => "api_error",
            EntityStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
