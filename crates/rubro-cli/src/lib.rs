//! Rubro CLI library.
//!
//! Argument parsing, configuration loading, command execution and output
//! formatting for the `rubro` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::load_config;
pub use error::{CliError, Result};
pub use output::Formatter;
