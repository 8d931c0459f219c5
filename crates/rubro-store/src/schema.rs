//! On-disk record schema, version 1
//!
//! Field names are the ones downstream consumers already read.

use chrono::{DateTime, Utc};
use rubro_domain::{ClassificationResult, CompletionRecord, Document, RunId, Rut};
use serde::{Deserialize, Serialize};

pub(crate) const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CompletionFile {
    pub schema_version: u32,
    pub run_id: String,
    pub written_at: DateTime<Utc>,
    pub rut: String,
    #[serde(rename = "giros_declarados_rut")]
    pub declared_rubros: Option<Vec<String>>,
    #[serde(rename = "documentos_emisor_original")]
    pub emisor_documents: Vec<String>,
    #[serde(rename = "documentos_receptor_original")]
    pub receptor_documents: Vec<String>,
    #[serde(rename = "completaciones_emisor_limpias")]
    pub emisor_completions: Vec<String>,
    #[serde(rename = "completaciones_receptor_limpias", default)]
    pub receptor_completions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClassificationFile {
    #[serde(flatten)]
    pub completion: CompletionFile,
    #[serde(rename = "clasificacion_economica")]
    pub rubros: Vec<String>,
    pub justification: String,
}

fn texts(documents: &[Document]) -> Vec<String> {
    documents.iter().map(|d| d.text.clone()).collect()
}

impl CompletionFile {
    pub fn from_record(record: &CompletionRecord, run_id: RunId) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.to_string(),
            written_at: Utc::now(),
            rut: record.rut.as_str().to_string(),
            declared_rubros: record.declared_rubros.clone(),
            emisor_documents: texts(&record.emisor_documents),
            receptor_documents: texts(&record.receptor_documents),
            emisor_completions: record.emisor_completions.clone(),
            receptor_completions: record.receptor_completions.clone(),
        }
    }

    pub fn into_record(self) -> CompletionRecord {
        CompletionRecord {
            rut: Rut::new(self.rut),
            declared_rubros: self.declared_rubros,
            emisor_documents: self.emisor_documents.into_iter().map(Document::emisor).collect(),
            receptor_documents: self
                .receptor_documents
                .into_iter()
                .map(Document::receptor)
                .collect(),
            emisor_completions: self.emisor_completions,
            receptor_completions: self.receptor_completions,
        }
    }
}

impl ClassificationFile {
    pub fn from_result(result: &ClassificationResult, run_id: RunId) -> Self {
        Self {
            completion: CompletionFile::from_record(&result.record, run_id),
            rubros: result.rubros.clone(),
            justification: result.justification.clone(),
        }
    }

    pub fn into_result(self) -> ClassificationResult {
        ClassificationResult {
            record: self.completion.into_record(),
            rubros: self.rubros,
            justification: self.justification,
        }
    }
}
