//! Config command implementation - write the default configuration

use crate::cli::args::Cli;
use crate::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::ExitCode;

pub async fn execute_config_command(
    cli: &Cli,
    output: Option<PathBuf>,
    force: bool,
) -> Result<ExitCode> {
    let path = output
        .or_else(|| cli.config.clone())
        .unwrap_or_else(AppConfig::default_path);

    if path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite it",
            path.display()
        );
    }

    AppConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("📝 Configuration written to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
