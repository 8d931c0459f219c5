//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rubro CLI - Classify the economic activity of RUTs with an LLM.
#[derive(Debug, Parser)]
#[command(name = "rubro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Complete sampled documents and classify each RUT
    Run(RunArgs),

    /// Complete sampled documents only
    Complete(RunArgs),

    /// Classify completion records stored by an earlier run
    Classify(ClassifyArgs),
}

/// Entity selection.
#[derive(Debug, Clone, Default, Args)]
pub struct EntityArgs {
    /// RUT to process (repeatable)
    #[arg(long = "rut")]
    pub ruts: Vec<String>,

    /// File with one RUT per line (repeatable)
    #[arg(long = "rut-list")]
    pub rut_lists: Vec<PathBuf>,
}

/// Supported provider presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// DeepSeek chat completions
    Deepseek,
    /// OpenAI chat completions
    Openai,
    /// Local Ollama daemon
    Ollama,
}

/// Overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Entities processed concurrently
    #[arg(long)]
    pub outer_workers: Option<usize>,

    /// Entities per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Provider preset
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Endpoint base URL
    #[arg(long, env = "RUBRO_BASE_URL")]
    pub base_url: Option<String>,

    /// Environment variable holding the API key
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Literal API key
    #[arg(long, env = "RUBRO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory of completion records
    #[arg(long)]
    pub completion_dir: Option<PathBuf>,

    /// Directory of classification results
    #[arg(long)]
    pub classification_dir: Option<PathBuf>,
}

/// Arguments for the run and complete commands.
#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub entities: EntityArgs,

    /// Document corpus (TSV, `label<TAB>text`)
    #[arg(long)]
    pub corpus: PathBuf,

    /// Declared rubros (JSON map of RUT to rubro list)
    #[arg(long)]
    pub declared: Option<PathBuf>,

    /// Maximum issuer documents sampled per RUT
    #[arg(long)]
    pub max_docs: Option<usize>,

    /// Sampling method (aleatorio, recientes, antiguos, estratificado)
    #[arg(short, long)]
    pub sampling: Option<String>,

    /// Concurrent completion calls per RUT
    #[arg(long)]
    pub inner_workers: Option<usize>,

    /// Seed for the sampling RNG
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Arguments for the classify command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// RUTs to classify; every stored record when omitted
    #[command(flatten)]
    pub entities: EntityArgs,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}
