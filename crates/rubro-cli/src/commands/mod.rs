//! Command implementations.

pub mod classify;
pub mod run;

pub use classify::execute_classify;
pub use run::execute_run;

use crate::cli::EntityArgs;
use crate::error::Result;
use crate::output::Formatter;
use rubro_domain::{RunId, Rut};
use rubro_llm::{build_provider, RateLimitedCaller};
use rubro_pipeline::{load_rut_lists, normalize_ruts, Orchestrator, PipelineConfig, ProgressEvent};
use rubro_store::JsonFileStore;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// RUTs named by `--rut` and `--rut-list`, uppercased, deduplicated and sorted.
pub fn collect_ruts(args: &EntityArgs) -> Result<Vec<Rut>> {
    let mut ruts = load_rut_lists(&args.rut_lists)?;
    ruts.extend(args.ruts.iter().map(Rut::new));
    Ok(normalize_ruts(ruts))
}

/// Build an orchestrator over the JSON file store for `config`.
pub(crate) fn build_orchestrator(config: &PipelineConfig) -> Result<Orchestrator<JsonFileStore>> {
    let provider = build_provider(&config.provider)?;
    let caller = RateLimitedCaller::new(provider);
    let run_id = RunId::new();
    let store = JsonFileStore::open(&config.completion_dir, &config.classification_dir, run_id)?;
    tracing::info!(
        "Run {} using {} at {} (model {})",
        run_id,
        config.provider.contract,
        config.provider.trimmed_base_url(),
        config.model
    );
    Ok(Orchestrator::new(caller, store, config)?)
}

/// Print progress events until the sender side is dropped.
pub(crate) fn spawn_progress_printer(
    mut rx: UnboundedReceiver<ProgressEvent>,
    formatter: Formatter,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = formatter.progress(&event) {
                eprintln!("{}", line);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_collect_ruts_merges_flags_and_files() {
        let mut list = tempfile::NamedTempFile::new().unwrap();
        writeln!(list, "3-3\n\n1-1").unwrap();
        let args = EntityArgs {
            ruts: vec!["2-2".to_string(), "1-1".to_string(), " ".to_string()],
            rut_lists: vec![list.path().to_path_buf()],
        };

        let ruts = collect_ruts(&args).unwrap();
        assert_eq!(ruts, vec![Rut::new("1-1"), Rut::new("2-2"), Rut::new("3-3")]);
    }

    #[test]
    fn test_collect_ruts_missing_file() {
        let args = EntityArgs {
            ruts: vec![],
            rut_lists: vec!["/nonexistent/list.txt".into()],
        };
        assert!(collect_ruts(&args).is_err());
    }
}
