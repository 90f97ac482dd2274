//! Erase command implementation

use crate::cli::args::{Cli, ConnectionArgs};
use crate::cli::commands::{build_session, finish_operation, load_config, spawn_console};
use crate::models::flash::FlashMode;
use anyhow::Result;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

const ERASE_WARNING: &str = "You want to \"Erase ESP\", which means you should reflash all files. Are you sure you want to continue? [y/N] ";

pub async fn execute_erase_command(
    cli: &Cli,
    connection: ConnectionArgs,
    yes: bool,
) -> Result<ExitCode> {
    if !yes && !confirm_erase().await? {
        println!("Erase cancelled");
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli)?;
    // Resolving the port may enumerate devices, so it happens after the prompt
    let session = build_session(&config, &connection);

    let (tx, console) = spawn_console();
    let outcome = session.run(FlashMode::Erase, tx).await?;
    finish_operation(outcome, console, connection.transcript.as_deref()).await
}

async fn confirm_erase() -> Result<bool> {
    use std::io::Write;

    print!("{}", ERASE_WARNING);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
