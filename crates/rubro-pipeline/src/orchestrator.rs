//! Batch orchestration
//!
//! Entities are split into batches processed strictly one after another.
//! Within a batch every entity is sampled first, then all of them are driven
//! concurrently under one outer pool; the batch is persisted once every
//! entity reached a terminal state.

use crate::config::{PipelineConfig, RunMode};
use crate::error::PipelineError;
use crate::metrics::RunMetrics;
use crate::progress::{Progress, ProgressEvent};
use crate::prompt::PromptBuilder;
use crate::sampler::{self, SamplingMethod};
use crate::taxonomy::Taxonomy;
use crate::types::{EntityInput, EntityOutcome, SampledEntity};
use crate::worker::Worker;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rubro_domain::{ClassificationResult, ResultStore, Rut};
use rubro_llm::{ConcurrencyPool, RateLimitedCaller};
use std::fmt::Display;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// Drives a whole run over a [`ResultStore`]
pub struct Orchestrator<S>
where
    S: ResultStore,
{
    worker: Worker,
    store: S,
    mode: RunMode,
    outer_workers: usize,
    max_docs: usize,
    sampling_method: SamplingMethod,
    rng: StdRng,
    progress: Progress,
}

impl<S> Orchestrator<S>
where
    S: ResultStore,
    S::Error: Display,
{
    /// Create an orchestrator, validating `config`
    pub fn new(caller: RateLimitedCaller, store: S, config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            worker: Worker::new(caller, PromptBuilder::default(), config),
            store,
            mode: RunMode::default(),
            outer_workers: config.outer_workers,
            max_docs: config.max_docs,
            sampling_method: config.sampling_method,
            rng,
            progress: Progress::disabled(),
        })
    }

    /// Set what each entity produces
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a custom reference taxonomy in classification prompts
    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.worker.set_prompts(PromptBuilder::new(taxonomy));
        self
    }

    /// Use a specific sampling RNG
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Report progress events to `tx`
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Progress::new(tx);
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sample, complete and (in full mode) classify every entity
    pub async fn run(&mut self, entities: Vec<EntityInput>, batch_size: usize) -> Result<RunMetrics, PipelineError> {
        let total = batch_count(entities.len(), batch_size)?;
        let started = Instant::now();
        let (issued, failed) = self.call_counters();
        let mut metrics = RunMetrics::new(entities.len());

        info!(
            "Starting {:?} run: {} entities in {} batches of up to {}",
            self.mode,
            entities.len(),
            total,
            batch_size
        );
        self.progress.emit(ProgressEvent::RunStarted {
            entities: entities.len(),
            batches: total,
        });
        let outer = ConcurrencyPool::new(self.outer_workers);

        for (index, batch) in entities.chunks(batch_size).enumerate() {
            let index = index + 1;
            self.begin_batch(index, total, batch.len());

            let mut outcomes = Vec::with_capacity(batch.len());
            let mut jobs = Vec::with_capacity(batch.len());
            for entity in batch {
                match self.sample_entity(entity) {
                    Some(job) => jobs.push(job),
                    None => {
                        let outcome = EntityOutcome::Skipped { rut: entity.rut.clone() };
                        self.progress.entity_finished(&outcome);
                        outcomes.push(outcome);
                    }
                }
            }

            let worker = &self.worker;
            let progress = &self.progress;
            let outer = &outer;
            let mode = self.mode;
            let calls = jobs.into_iter().map(|job| async move {
                let outcome = worker.process(job, mode, outer).await;
                progress.entity_finished(&outcome);
                outcome
            });
            outcomes.extend(join_all(calls).await);

            self.finish_batch(index, total, &outcomes, true, &mut metrics);
        }

        Ok(self.finish_run(metrics, started, issued, failed))
    }

    /// Classify completion records persisted by an earlier run
    ///
    /// Each classification call holds one permit of the outer pool. RUTs
    /// without a stored record are skipped.
    pub async fn classify_stored(&mut self, ruts: Vec<Rut>, batch_size: usize) -> Result<RunMetrics, PipelineError> {
        let total = batch_count(ruts.len(), batch_size)?;
        let started = Instant::now();
        let (issued, failed) = self.call_counters();
        let mut metrics = RunMetrics::new(ruts.len());

        info!(
            "Starting classification of stored records: {} entities in {} batches",
            ruts.len(),
            total
        );
        self.progress.emit(ProgressEvent::RunStarted {
            entities: ruts.len(),
            batches: total,
        });
        let outer = ConcurrencyPool::new(self.outer_workers);

        for (index, batch) in ruts.chunks(batch_size).enumerate() {
            let index = index + 1;
            self.begin_batch(index, total, batch.len());

            let mut outcomes = Vec::with_capacity(batch.len());
            let mut records = Vec::with_capacity(batch.len());
            for rut in batch {
                match self.store.load_completion(rut) {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {
                        warn!("No stored completion record for {}, skipped", rut);
                        outcomes.push(EntityOutcome::Skipped { rut: rut.clone() });
                    }
                    Err(e) => {
                        error!("Failed to load completion record for {}: {}", rut, e);
                        outcomes.push(EntityOutcome::Failed {
                            rut: rut.clone(),
                            record: None,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            for outcome in &outcomes {
                self.progress.entity_finished(outcome);
            }

            let worker = &self.worker;
            let progress = &self.progress;
            let outer = &outer;
            let calls = records.into_iter().map(|record| async move {
                let outcome = worker.process_stored(record, outer).await;
                progress.entity_finished(&outcome);
                outcome
            });
            outcomes.extend(join_all(calls).await);

            self.finish_batch(index, total, &outcomes, false, &mut metrics);
        }

        Ok(self.finish_run(metrics, started, issued, failed))
    }

    fn sample_entity(&mut self, entity: &EntityInput) -> Option<SampledEntity> {
        let sample = sampler::sample(
            &entity.documents.emisor,
            self.max_docs,
            self.sampling_method,
            &mut self.rng,
        );
        if sample.is_empty() {
            info!("Entity {}: no issuer documents to sample, skipped", entity.rut);
            return None;
        }
        debug!(
            "Entity {}: sampled {} of {} issuer documents",
            entity.rut,
            sample.len(),
            entity.documents.emisor.len()
        );
        Some(SampledEntity {
            rut: entity.rut.clone(),
            declared_rubros: entity.declared_rubros.clone(),
            sample,
            receptor: entity.documents.receptor.clone(),
        })
    }

    fn call_counters(&self) -> (usize, usize) {
        let stats = self.worker.caller().stats();
        (stats.issued(), stats.failed())
    }

    fn begin_batch(&self, index: usize, total: usize, size: usize) {
        info!("Batch {}/{}: {} entities", index, total, size);
        self.progress.emit(ProgressEvent::BatchStarted { index, total, size });
    }

    fn finish_batch(
        &self,
        index: usize,
        total: usize,
        outcomes: &[EntityOutcome],
        save_completions: bool,
        metrics: &mut RunMetrics,
    ) {
        let written = self.persist(outcomes, save_completions, metrics);
        for outcome in outcomes {
            metrics.record_outcome(outcome);
        }
        metrics.batches += 1;
        self.progress.emit(ProgressEvent::BatchPersisted { index, written });
        info!("Batch {}/{} persisted: {} files written", index, total, written);
    }

    /// Write every non-skipped outcome; store errors are logged and counted
    fn persist(&self, outcomes: &[EntityOutcome], save_completions: bool, metrics: &mut RunMetrics) -> usize {
        let classifies = self.mode == RunMode::Full || !save_completions;
        let mut written = 0;

        for outcome in outcomes {
            match outcome {
                EntityOutcome::Skipped { .. } => {}
                EntityOutcome::Completed(record) => {
                    self.write(&record.rut, "completion", self.store.save_completion(record), &mut written, metrics);
                }
                EntityOutcome::Classified(result) => {
                    if save_completions {
                        self.write(
                            result.rut(),
                            "completion",
                            self.store.save_completion(&result.record),
                            &mut written,
                            metrics,
                        );
                    }
                    self.write(
                        result.rut(),
                        "classification",
                        self.store.save_classification(result),
                        &mut written,
                        metrics,
                    );
                }
                EntityOutcome::Failed { rut, record, reason } => {
                    let Some(record) = record else {
                        warn!("Entity {} failed without a record, nothing written", rut);
                        continue;
                    };
                    if save_completions {
                        self.write(rut, "completion", self.store.save_completion(record), &mut written, metrics);
                    }
                    if classifies {
                        let sentinel = ClassificationResult::failed(record.clone(), reason.clone());
                        self.write(
                            rut,
                            "classification",
                            self.store.save_classification(&sentinel),
                            &mut written,
                            metrics,
                        );
                    }
                }
            }
        }
        written
    }

    fn write(
        &self,
        rut: &Rut,
        kind: &str,
        result: Result<(), S::Error>,
        written: &mut usize,
        metrics: &mut RunMetrics,
    ) {
        match result {
            Ok(()) => {
                debug!("Stored {} record for {}", kind, rut);
                *written += 1;
                metrics.records_written += 1;
            }
            Err(e) => {
                error!("Failed to store {} record for {}: {}", kind, rut, e);
                metrics.write_failures += 1;
            }
        }
    }

    fn finish_run(&self, mut metrics: RunMetrics, started: Instant, issued: usize, failed: usize) -> RunMetrics {
        let (issued_now, failed_now) = self.call_counters();
        metrics.calls_issued = issued_now - issued;
        metrics.calls_failed = failed_now - failed;
        metrics.elapsed = started.elapsed();

        self.progress.emit(ProgressEvent::RunFinished);
        info!("Run finished:\n{}", metrics.summary());
        metrics
    }
}

fn batch_count(entities: usize, batch_size: usize) -> Result<usize, PipelineError> {
    if batch_size == 0 {
        return Err(PipelineError::Config("batch_size must be greater than 0".to_string()));
    }
    Ok(entities.div_ceil(batch_size))
}
