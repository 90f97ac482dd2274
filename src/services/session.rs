//! Flashing session state
//!
//! Holds what the user has chosen so far (images, addresses, chip, baud,
//! port, the loaded archive) and hands complete plans to the executor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::errors::{FlasherError, Result};
use crate::models::AppEvent;
use crate::models::flash::{
    BaudRate, Chip, FlashMode, FlashPlan, FlashRole, FlashTargets, PortSelection,
};
use crate::services::archive_service::ArchiveBundle;
use crate::services::flash_service::{FlashExecutor, FlashOutcome};
use crate::services::plan_builder::FlashPlanBuilder;
use crate::utils::esptool_utils::FlashTool;

pub struct FlasherSession {
    pub chip: Chip,
    pub baud: BaudRate,
    pub port: PortSelection,
    targets: FlashTargets,
    archive: Option<ArchiveBundle>,
    executor: FlashExecutor,
}

impl FlasherSession {
    pub fn new(tool: Arc<dyn FlashTool>) -> Self {
        Self {
            chip: Chip::default(),
            baud: BaudRate::default(),
            port: PortSelection::Auto,
            targets: FlashTargets::new(),
            archive: None,
            executor: FlashExecutor::new(tool),
        }
    }

    /// Session seeded with the chip, baud and addresses from `config`
    pub fn with_config(tool: Arc<dyn FlashTool>, config: &AppConfig) -> Self {
        let mut session = Self::new(tool);
        session.chip = config.defaults.chip;
        session.baud = config.defaults.baud;
        for role in FlashRole::ORDER {
            session
                .targets
                .set_address(role, config.addresses.for_role(role));
        }
        session
    }

    pub fn targets(&self) -> &FlashTargets {
        &self.targets
    }

    pub fn executor(&self) -> &FlashExecutor {
        &self.executor
    }

    pub fn archive(&self) -> Option<&ArchiveBundle> {
        self.archive.as_ref()
    }

    /// Replace the current archive with `path`.
    ///
    /// The previous scratch directory is removed first. On failure no
    /// target is changed.
    pub fn load_archive(&mut self, path: &Path) -> Result<()> {
        self.ensure_idle()?;
        self.archive = None;

        let bundle = ArchiveBundle::extract(path)?;
        bundle.apply_to(&mut self.targets);
        self.archive = Some(bundle);
        Ok(())
    }

    /// Use `path` for `role` and mark it for flashing
    pub fn select_file(&mut self, role: FlashRole, path: &Path) -> Result<()> {
        self.ensure_idle()?;
        let path = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
        log::debug!("{} image set to {}", role, path.display());
        self.targets.select_file(role, path);
        Ok(())
    }

    pub fn set_address(&mut self, role: FlashRole, address: &str) {
        self.targets.set_address(role, address);
    }

    pub fn deselect(&mut self, role: FlashRole) {
        self.targets.deselect(role);
    }

    pub fn plan(&self, mode: FlashMode) -> Result<FlashPlan> {
        FlashPlanBuilder::new(self.chip, self.baud, self.port.clone()).build(mode, &self.targets)
    }

    /// Write the selected images in the background
    pub fn flash(
        &self,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<JoinHandle<FlashOutcome>> {
        self.start(FlashMode::Write, events)
    }

    /// Erase the whole flash in the background
    pub fn erase(
        &self,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<JoinHandle<FlashOutcome>> {
        self.start(FlashMode::Erase, events)
    }

    /// Build the plan for `mode`, run it and wait for the outcome
    pub async fn run(
        &self,
        mode: FlashMode,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<FlashOutcome> {
        self.ensure_idle()?;
        let plan = self.plan(mode)?;
        self.executor.run(plan, events).await
    }

    fn start(
        &self,
        mode: FlashMode,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<JoinHandle<FlashOutcome>> {
        self.ensure_idle()?;
        let plan = self.plan(mode)?;
        self.executor.start(plan, events)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.executor.is_busy() {
            Err(FlasherError::Busy)
        } else {
            Ok(())
        }
    }
}
