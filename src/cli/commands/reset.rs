//! Reset command implementation

use crate::cli::args::Cli;
use crate::cli::commands::load_config;
use crate::services::reset_service;
use crate::utils::serial_utils;
use anyhow::{Result, anyhow};
use std::process::ExitCode;

pub async fn execute_reset_command(cli: &Cli, port: Option<String>) -> Result<ExitCode> {
    let port = match port {
        Some(port) => port,
        None => {
            let config = load_config(cli)?;
            config
                .defaults
                .port
                .filter(|p| !p.eq_ignore_ascii_case("auto"))
                .or_else(serial_utils::first_serial_device)
                .ok_or_else(|| anyhow!("No serial port found, pass one with --port"))?
        }
    };

    match reset_service::reset_device(&port).await {
        Ok(()) => {
            println!("✅ Reset pulse sent to {}", port);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::error!("Reset failed: {}", e);
            println!("--- ERROR ---");
            println!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
