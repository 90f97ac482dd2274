//! CLI command implementations

pub mod config;
pub mod erase;
pub mod flash;
pub mod inspect;
pub mod ports;
pub mod reset;

use crate::cli::args::{Cli, Commands, ConnectionArgs};
use crate::config::AppConfig;
use crate::models::AppEvent;
use crate::models::flash::PortSelection;
use crate::services::{FlashOutcome, FlasherSession};
use crate::utils::console::{ConsoleBuffer, ConsoleSink, StdoutConsole};
use crate::utils::esptool_utils::EsptoolProcess;
use crate::utils::serial_utils;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Execute a CLI command
pub async fn execute_command(command: Commands, cli: &Cli) -> Result<ExitCode> {
    match command {
        Commands::Flash { images, connection } => {
            flash::execute_flash_command(cli, images, connection).await
        }
        Commands::Erase { connection, yes } => {
            erase::execute_erase_command(cli, connection, yes).await
        }
        Commands::Reset { port } => reset::execute_reset_command(cli, port).await,
        Commands::Ports => ports::execute_ports_command().await,
        Commands::Inspect { archive } => inspect::execute_inspect_command(&archive).await,
        Commands::Config { output, force } => {
            config::execute_config_command(cli, output, force).await
        }
    }
}

/// Load the configuration named on the command line, or the default one
pub(crate) fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    AppConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Pick the serial port: flag, then config, then first enumerated device.
/// Falls back to auto-detection when nothing is found.
pub(crate) fn resolve_port(connection: &ConnectionArgs, config: &AppConfig) -> PortSelection {
    if connection.auto_port {
        return PortSelection::Auto;
    }

    let configured = connection
        .port
        .clone()
        .or_else(|| config.defaults.port.clone());

    match configured {
        Some(port) if port.eq_ignore_ascii_case("auto") => PortSelection::Auto,
        Some(port) => PortSelection::Named(port),
        None => match serial_utils::first_serial_device() {
            Some(port) => {
                log::info!("No port given, using {}", port);
                PortSelection::Named(port)
            }
            None => {
                log::info!("No serial port found, letting esptool auto-detect");
                PortSelection::Auto
            }
        },
    }
}

/// Session built from the configuration with the connection flags applied
pub(crate) fn build_session(config: &AppConfig, connection: &ConnectionArgs) -> FlasherSession {
    let tool = Arc::new(EsptoolProcess::from_config(&config.tool));
    let mut session = FlasherSession::with_config(tool, config);

    if let Some(chip) = connection.chip {
        session.chip = chip;
    }
    if let Some(baud) = connection.baud {
        session.baud = baud;
    }
    session.port = resolve_port(connection, config);
    session
}

/// Spawn the task that prints operation events as they arrive.
///
/// The task ends once every sender is dropped and hands back the
/// backspace-corrected transcript.
pub(crate) fn spawn_console() -> (mpsc::UnboundedSender<AppEvent>, JoinHandle<ConsoleBuffer>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let handle = tokio::spawn(async move {
        let mut stdout = StdoutConsole;
        let mut transcript = ConsoleBuffer::new();

        while let Some(event) = rx.recv().await {
            let text = match event {
                AppEvent::ToolOutput(chunk) => chunk,
                AppEvent::Info(message) | AppEvent::Error(message) => format!("\n{}\n", message),
                AppEvent::Warning(message) => format!("{}\n", message),
                AppEvent::OperationStarted(mode) => {
                    log::debug!("{} operation started", mode);
                    continue;
                }
                AppEvent::OperationFinished(mode, success) => {
                    log::debug!("{} operation finished (success: {})", mode, success);
                    continue;
                }
            };
            stdout.write_chunk(&text);
            transcript.push(&text);
        }

        transcript
    });

    (tx, handle)
}

/// Wait for the console to drain, save the transcript if asked, and turn
/// the outcome into an exit code.
pub(crate) async fn finish_operation(
    outcome: FlashOutcome,
    console: JoinHandle<ConsoleBuffer>,
    transcript: Option<&Path>,
) -> Result<ExitCode> {
    let buffer = console.await.context("Console task failed")?;

    if let Some(path) = transcript {
        std::fs::write(path, buffer.text())
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        log::info!("Transcript written to {}", path.display());
    }

    if outcome.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
