//! Run and complete command implementation.

use super::{build_orchestrator, collect_ruts, spawn_progress_printer};
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rubro_pipeline::{build_inputs, Corpus, DeclaredRubros, PipelineConfig, RunMetrics, RunMode};

/// Execute the run (`RunMode::Full`) or complete (`RunMode::CompleteOnly`) command.
pub async fn execute_run(
    args: RunArgs,
    mode: RunMode,
    mut config: PipelineConfig,
    formatter: &Formatter,
) -> Result<RunMetrics> {
    args.apply(&mut config)?;

    let ruts = collect_ruts(&args.entities)?;
    if ruts.is_empty() {
        return Err(CliError::InvalidInput(
            "no RUTs given, use --rut or --rut-list".to_string(),
        ));
    }

    let corpus = Corpus::load_tsv(&args.corpus)?;
    let declared = match &args.declared {
        Some(path) => DeclaredRubros::load_json(path)?,
        None => DeclaredRubros::default(),
    };
    let inputs = build_inputs(&ruts, &corpus, &declared);
    let missing = inputs.iter().filter(|i| i.documents.emisor.is_empty()).count();
    if missing > 0 {
        eprintln!(
            "{}",
            formatter.warning(&format!("{} RUT(s) have no issuer documents in the corpus", missing))
        );
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = spawn_progress_printer(rx, *formatter);
    let mut orchestrator = build_orchestrator(&config)?.with_mode(mode).with_progress(tx);

    let result = orchestrator.run(inputs, config.batch_size).await;
    drop(orchestrator);
    let _ = printer.await;
    Ok(result?)
}
