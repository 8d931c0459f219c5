//! Rubro CLI - Economic sector classification of RUTs.

use clap::Parser;
use rubro_cli::{commands, load_config, Cli, CliError, Command, Formatter};
use rubro_pipeline::RunMode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> rubro_cli::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let formatter = Formatter::new(!cli.no_color);

    let execution = async {
        match cli.command {
            Command::Run(args) => commands::execute_run(args, RunMode::Full, config, &formatter).await,
            Command::Complete(args) => {
                commands::execute_run(args, RunMode::CompleteOnly, config, &formatter).await
            }
            Command::Classify(args) => commands::execute_classify(args, config, &formatter).await,
        }
    };

    let metrics = tokio::select! {
        result = execution => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received, abandoning the current batch");
            return Err(CliError::Interrupted);
        }
    };

    println!("{}", formatter.run_report(&metrics));
    Ok(())
}
