//! Flash command implementation

use crate::cli::args::{Cli, ConnectionArgs, ImageArgs};
use crate::cli::commands::{build_session, finish_operation, load_config, spawn_console};
use crate::models::flash::{FlashMode, FlashRole};
use crate::services::FlasherSession;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;

pub async fn execute_flash_command(
    cli: &Cli,
    images: ImageArgs,
    connection: ConnectionArgs,
) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut session = build_session(&config, &connection);

    apply_images(&mut session, &images)?;

    for target in session.targets().selected() {
        log::info!(
            "{} @ {}: {}",
            target.role,
            target.flash_address,
            target
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
    }

    let (tx, console) = spawn_console();
    let outcome = session.run(FlashMode::Write, tx).await?;
    finish_operation(outcome, console, connection.transcript.as_deref()).await
}

/// Load the archive first, then let explicit files and addresses override it
pub(crate) fn apply_images(session: &mut FlasherSession, images: &ImageArgs) -> Result<()> {
    if let Some(archive) = &images.archive {
        session
            .load_archive(archive)
            .with_context(|| format!("Error loading zip file {}", archive.display()))?;
    }

    let files: [(FlashRole, &Option<PathBuf>); 4] = [
        (FlashRole::Bootloader, &images.bootloader),
        (FlashRole::PartitionTable, &images.partitions),
        (FlashRole::Application, &images.app),
        (FlashRole::FilesystemImage, &images.spiffs),
    ];
    for (role, file) in files {
        if let Some(path) = file {
            session.select_file(role, path)?;
        }
    }

    let addresses: [(FlashRole, &Option<String>); 4] = [
        (FlashRole::Bootloader, &images.bootloader_addr),
        (FlashRole::PartitionTable, &images.partitions_addr),
        (FlashRole::Application, &images.app_addr),
        (FlashRole::FilesystemImage, &images.spiffs_addr),
    ];
    for (role, address) in addresses {
        if let Some(address) = address {
            session.set_address(role, address);
        }
    }

    Ok(())
}
