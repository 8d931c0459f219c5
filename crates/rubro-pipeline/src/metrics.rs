//! Metrics collected during a run

use crate::types::{EntityOutcome, EntityStatus};
use std::time::Duration;

/// Counters of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    /// Entities handed to the run
    pub entities: usize,

    /// Batches processed
    pub batches: usize,

    /// Entities classified with real rubros
    pub classified: usize,

    /// Entities classified with the API_ERROR sentinel
    pub sentinel: usize,

    /// Entities whose completions were written (completion-only runs)
    pub completed: usize,

    /// Entities with nothing to process
    pub skipped: usize,

    /// Entities that hit an unexpected fault
    pub failed: usize,

    /// Calls that reached the provider
    pub calls_issued: usize,

    /// Calls that ended in an error
    pub calls_failed: usize,

    /// Files written to the store
    pub records_written: usize,

    /// Store writes that failed
    pub write_failures: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunMetrics {
    /// Create new empty metrics for `entities` inputs
    pub fn new(entities: usize) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// Count one terminal outcome
    pub fn record_outcome(&mut self, outcome: &EntityOutcome) {
        match outcome.status() {
            EntityStatus::Skipped => self.skipped += 1,
            EntityStatus::Completed => self.completed += 1,
            EntityStatus::Classified => self.classified += 1,
            EntityStatus::Sentinel => self.sentinel += 1,
            EntityStatus::Failed => self.failed += 1,
        }
    }

    /// Entities that reached a terminal state
    pub fn processed(&self) -> usize {
        self.classified + self.sentinel + self.completed + self.skipped + self.failed
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Run Metrics Summary".to_string(),
            "===================".to_string(),
            format!("Entities: {} in {} batches", self.entities, self.batches),
            format!("Elapsed: {:.1}s", self.elapsed.as_secs_f64()),
            String::new(),
        ];
        if self.classified + self.sentinel > 0 {
            lines.push(format!("Classified: {}", self.classified));
            lines.push(format!("API_ERROR sentinel: {}", self.sentinel));
        }
        if self.completed > 0 {
            lines.push(format!("Completed: {}", self.completed));
        }
        lines.push(format!("Skipped: {}", self.skipped));
        lines.push(format!("Failed: {}", self.failed));
        lines.push(String::new());
        lines.push(format!("LLM calls: {} ({} failed)", self.calls_issued, self.calls_failed));
        lines.push(format!("Records written: {}", self.records_written));
        if self.write_failures > 0 {
            lines.push(format!("Write failures: {}", self.write_failures));
        }
        lines.join("\n")
    }
}
