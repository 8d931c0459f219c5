//! Classify command implementation.

use super::{build_orchestrator, collect_ruts, spawn_progress_printer};
use crate::cli::ClassifyArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rubro_pipeline::{PipelineConfig, RunMetrics};

/// Execute the classify command over stored completion records.
pub async fn execute_classify(
    args: ClassifyArgs,
    mut config: PipelineConfig,
    formatter: &Formatter,
) -> Result<RunMetrics> {
    args.overrides.apply(&mut config);

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let mut orchestrator = build_orchestrator(&config)?.with_progress(tx);

    let mut ruts = collect_ruts(&args.entities)?;
    if ruts.is_empty() {
        ruts = orchestrator.store().stored_completions()?;
        eprintln!(
            "{}",
            formatter.info(&format!(
                "{} stored completion record(s) found in {}",
                ruts.len(),
                config.completion_dir.display()
            ))
        );
    }
    if ruts.is_empty() {
        return Err(CliError::InvalidInput(
            "no stored completion records to classify".to_string(),
        ));
    }

    let printer = spawn_progress_printer(rx, *formatter);
    let result = orchestrator.classify_stored(ruts, config.batch_size).await;
    drop(orchestrator);
    let _ = printer.await;
    Ok(result?)
}
