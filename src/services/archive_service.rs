//! Project archive loading
//!
//! A project archive is a flat zip of firmware images. It is extracted into
//! a scratch directory and each image role is recognised by its filename
//! pattern (`firmware_*.bin`, `partitions_*.bin`, ...).

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::{FlasherError, Result};
use crate::models::flash::{FlashRole, FlashTargets};

/// One entry of the archive directory
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
}

/// An extracted archive. The scratch directory is removed on drop.
#[derive(Debug)]
pub struct ArchiveBundle {
    source: PathBuf,
    scratch: TempDir,
    entries: Vec<ArchiveEntry>,
    matches: HashMap<FlashRole, PathBuf>,
}

impl ArchiveBundle {
    /// Extract `archive` into a fresh scratch directory and look for images
    pub fn extract(archive: &Path) -> Result<Self> {
        let file = File::open(archive).map_err(|e| {
            FlasherError::Archive(format!("cannot open {}: {}", archive.display(), e))
        })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| {
            FlasherError::Archive(format!("cannot read {}: {}", archive.display(), e))
        })?;

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip.by_index(i)?;
            entries.push(ArchiveEntry {
                name: entry.name().to_string(),
                size: entry.size(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("ESP_flasher_")
            .tempdir()
            .map_err(|e| FlasherError::Archive(format!("cannot create scratch directory: {}", e)))?;

        zip.extract(scratch.path()).map_err(|e| {
            FlasherError::Archive(format!("cannot extract {}: {}", archive.display(), e))
        })?;

        log::info!(
            "Extracted {} ({} entries) to {}",
            archive.display(),
            entries.len(),
            scratch.path().display()
        );

        let mut matches = HashMap::new();
        for role in FlashRole::ORDER {
            if let Some(path) = find_first(scratch.path(), role.archive_pattern())? {
                log::debug!("{} image found in archive: {}", role, path.display());
                matches.insert(role, path);
            }
        }

        Ok(Self {
            source: archive.to_path_buf(),
            scratch,
            entries,
            matches,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Extracted image for `role`, if the archive had one
    pub fn image(&self, role: FlashRole) -> Option<&Path> {
        self.matches.get(&role).map(PathBuf::as_path)
    }

    /// Select every role the archive provides. Other roles are untouched.
    pub fn apply_to(&self, targets: &mut FlashTargets) {
        for role in FlashRole::ORDER {
            if let Some(path) = self.image(role) {
                targets.select_file(role, path);
            }
        }
    }
}

/// First file (in sorted order) directly inside `dir` matching `pattern`
fn find_first(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped, pattern);

    let paths = glob::glob(&full_pattern)
        .map_err(|e| FlasherError::Archive(format!("bad pattern {}: {}", pattern, e)))?;

    let mut found: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
    found.sort();
    Ok(found.into_iter().next())
}
