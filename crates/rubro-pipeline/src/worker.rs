//! Per-entity processing
//!
//! A [`Worker`] runs the two call tiers for one entity: a concurrent fan-out
//! of completion calls under a fresh inner pool, then a single
//! classification call. Errors are caught at this boundary and reported as
//! [`EntityOutcome::Failed`], so one entity never aborts its batch.

use crate::config::{PipelineConfig, RunMode};
use crate::error::PipelineError;
use crate::parser::ClassificationReply;
use crate::prompt::PromptBuilder;
use crate::sanitize::sanitize;
use crate::types::{EntityOutcome, SampledEntity};
use futures::future::join_all;
use rubro_domain::{ClassificationResult, CompletionRecord, Document, Rut};
use rubro_llm::{ConcurrencyPool, RateLimitedCaller};
use tracing::{debug, error, info, warn};

/// Justification prefix of every failed classification
pub const API_ERROR_JUSTIFICATION: &str = "Error en llamada a la API";

/// Justification used when no completion survived
pub const NO_COMPLETIONS_JUSTIFICATION: &str =
    "Error en llamada a la API: ninguna completación válida para clasificar";

/// Runs the completion and classification calls of single entities
#[derive(Clone)]
pub struct Worker {
    caller: RateLimitedCaller,
    prompts: PromptBuilder,
    model: String,
    temperature: f64,
    inner_workers: usize,
}

impl Worker {
    /// Create a worker using the model settings of `config`
    pub fn new(caller: RateLimitedCaller, prompts: PromptBuilder, config: &PipelineConfig) -> Self {
        Self {
            caller,
            prompts,
            model: config.model.clone(),
            temperature: config.temperature,
            inner_workers: config.inner_workers,
        }
    }

    /// The caller shared by every call of this worker
    pub fn caller(&self) -> &RateLimitedCaller {
        &self.caller
    }

    /// Replace the prompt builder
    pub fn set_prompts(&mut self, prompts: PromptBuilder) {
        self.prompts = prompts;
    }

    /// Process one sampled entity while holding a permit of `outer`
    ///
    /// Never fails: errors become [`EntityOutcome::Failed`] carrying the base
    /// record, so a sentinel classification can still be written.
    pub async fn process(
        &self,
        job: SampledEntity,
        mode: RunMode,
        outer: &ConcurrencyPool,
    ) -> EntityOutcome {
        match self.try_process(&job, mode, outer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Entity {} failed: {}", job.rut, e);
                EntityOutcome::Failed {
                    rut: job.rut.clone(),
                    record: Some(job.base_record()),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Classify a stored completion record, the call holding a permit of `pool`
    pub async fn process_stored(&self, record: CompletionRecord, pool: &ConcurrencyPool) -> EntityOutcome {
        EntityOutcome::Classified(self.classify(record, pool).await)
    }

    async fn try_process(
        &self,
        job: &SampledEntity,
        mode: RunMode,
        outer: &ConcurrencyPool,
    ) -> Result<EntityOutcome, PipelineError> {
        let _permit = outer.acquire().await.map_err(|e| PipelineError::Entity {
            rut: job.rut.to_string(),
            reason: e.cause,
        })?;
        let inner = ConcurrencyPool::new(self.inner_workers);

        let mut record = job.base_record();
        record.emisor_completions = self.complete_documents(&job.rut, &job.sample, &inner).await;
        info!(
            "Entity {}: {} of {} completions kept",
            job.rut,
            record.emisor_completions.len(),
            job.sample.len()
        );

        match mode {
            RunMode::CompleteOnly => Ok(EntityOutcome::Completed(record)),
            RunMode::Full => Ok(EntityOutcome::Classified(self.classify(record, &inner).await)),
        }
    }

    /// Complete every document concurrently under `pool`
    ///
    /// Failed calls and answers that are empty after sanitizing are dropped.
    /// Surviving completions keep the order of `documents`.
    pub async fn complete_documents(
        &self,
        rut: &Rut,
        documents: &[Document],
        pool: &ConcurrencyPool,
    ) -> Vec<String> {
        let prompts: Vec<String> = documents
            .iter()
            .map(|document| self.prompts.completion(&document.text))
            .collect();
        let calls = prompts
            .iter()
            .map(|prompt| self.caller.call(prompt, &self.model, self.temperature, pool));

        join_all(calls)
            .await
            .into_iter()
            .filter_map(|answer| match answer {
                Ok(text) => {
                    let cleaned = sanitize(&text);
                    if cleaned.is_empty() {
                        debug!("Entity {}: completion empty after sanitizing", rut);
                        None
                    } else {
                        Some(cleaned)
                    }
                }
                Err(e) => {
                    debug!("Entity {}: completion dropped: {}", rut, e);
                    None
                }
            })
            .collect()
    }

    /// Classify a completion record with one call under `pool`
    ///
    /// Without completions no call is made and the sentinel is returned.
    pub async fn classify(&self, record: CompletionRecord, pool: &ConcurrencyPool) -> ClassificationResult {
        if !record.has_completions() {
            warn!("Entity {}: no completions to classify", record.rut);
            return ClassificationResult::failed(record, NO_COMPLETIONS_JUSTIFICATION);
        }

        let prompt = self.prompts.classification(
            &record.emisor_completions,
            &record.receptor_completions,
            record.declared_rubros.as_deref(),
        );

        match self.caller.call_json(&prompt, &self.model, self.temperature, pool).await {
            Ok(answer) => match ClassificationReply::from_text(&sanitize(&answer)) {
                Some(reply) => {
                    info!("Entity {} classified as {:?}", record.rut, reply.rubros);
                    ClassificationResult {
                        record,
                        rubros: reply.rubros,
                        justification: reply.justification,
                    }
                }
                None => {
                    warn!("Entity {}: no JSON object in classification answer", record.rut);
                    ClassificationResult::failed(
                        record,
                        format!("{}: respuesta sin objeto JSON", API_ERROR_JUSTIFICATION),
                    )
                }
            },
            Err(e) => {
                warn!("Entity {}: classification call failed: {}", record.rut, e);
                ClassificationResult::failed(record, format!("{}: {}", API_ERROR_JUSTIFICATION, e.cause))
            }
        }
    }
}
