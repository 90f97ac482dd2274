//! Command Line Interface module
//!
//! Argument parsing and the command implementations.

pub mod args;
pub mod commands;

pub use args::*;

use anyhow::Result;
use std::process::ExitCode;

use crate::utils::logging;

/// Main CLI application runner
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    logging::init_cli_logging(cli.verbose, cli.quiet)?;

    commands::execute_command(cli.command.clone(), &cli).await
}
