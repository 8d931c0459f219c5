//! Output formatting for the CLI.

use colored::*;
use rubro_pipeline::{EntityStatus, ProgressEvent, RunMetrics};

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// One line per progress event worth showing.
    pub fn progress(&self, event: &ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::RunStarted { entities, batches } => Some(self.info(&format!(
                "{} RUTs in {} batch(es)",
                entities, batches
            ))),
            ProgressEvent::BatchStarted { index, total, size } => Some(self.info(&format!(
                "Batch {}/{} ({} RUTs)",
                index, total, size
            ))),
            ProgressEvent::EntityFinished { rut, status } => {
                let line = format!("{} {}", rut, status);
                Some(match status {
                    EntityStatus::Classified | EntityStatus::Completed => self.success(&line),
                    EntityStatus::Skipped => self.warning(&line),
                    EntityStatus::Sentinel | EntityStatus::Failed => self.error(&line),
                })
            }
            ProgressEvent::BatchPersisted { index, written } => Some(self.colorize(
                &format!("  batch {} saved, {} file(s)", index, written),
                "cyan",
            )),
            ProgressEvent::RunFinished => None,
        }
    }

    /// Final report of a run.
    pub fn run_report(&self, metrics: &RunMetrics) -> String {
        let headline = if metrics.failed + metrics.sentinel + metrics.write_failures == 0 {
            self.success("Run completed")
        } else {
            self.warning("Run completed with failures")
        };
        format!("{}\n{}", headline, metrics.summary())
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
