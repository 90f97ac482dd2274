//! Inspect command implementation - show what a project archive contains

use crate::models::flash::{FlashRole, FlashTargets};
use crate::services::ArchiveBundle;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

pub async fn execute_inspect_command(archive: &Path) -> Result<ExitCode> {
    let bundle = ArchiveBundle::extract(archive)
        .with_context(|| format!("Error loading zip file {}", archive.display()))?;

    println!("{:<40} {:>10}", "File Name", "Size");
    for entry in bundle.entries() {
        println!("{:<40} {:>10}", entry.name, entry.size);
    }
    println!();

    let mut targets = FlashTargets::new();
    bundle.apply_to(&mut targets);

    for role in FlashRole::ORDER {
        let target = targets.get(role);
        match bundle.image(role) {
            Some(path) => println!(
                "{:<16} {:>9}  {}",
                role.to_string(),
                target.flash_address,
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
            None => println!("{:<16} {:>9}  (not in archive)", role.to_string(), "-"),
        }
    }

    Ok(ExitCode::SUCCESS)
}
