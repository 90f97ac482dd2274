//! Ports command implementation - list available serial ports

use crate::utils::serial_utils;
use anyhow::Result;
use std::process::ExitCode;

/// Execute the ports command to list serial devices
pub async fn execute_ports_command() -> Result<ExitCode> {
    log::info!("rescanning serial ports...");

    let devices = serial_utils::list_serial_devices()?;

    if devices.is_empty() {
        println!("⚠️  No serial ports detected");
        return Ok(ExitCode::SUCCESS);
    }

    for device in &devices {
        println!("{}", device);
    }

    log::debug!("Total ports detected: {}", devices.len());
    Ok(ExitCode::SUCCESS)
}
