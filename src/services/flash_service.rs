//! Single-flight execution of the flashing tool
//!
//! `FlashExecutor` runs one plan at a time on a background tokio task. A
//! second request while a plan is running is rejected with
//! `FlasherError::Busy`; nothing is queued. Tool failures end the operation
//! normally and are reported through the returned `FlashOutcome` and the
//! event channel, never as an error to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::{FlasherError, Result, ToolError};
use crate::models::AppEvent;
use crate::models::flash::{FlashMode, FlashPlan};
use crate::utils::esptool_utils::FlashTool;

const UNEXPECTED_HINT: &str = "unexpected error, maybe you chose invalid files, or files which overlap";

/// Shared busy flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    busy: Arc<AtomicBool>,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Claim the flag, or `None` if someone else holds it
    fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                busy: self.busy.clone(),
            })
    }
}

/// Releases the busy flag when dropped, including on panic
#[derive(Debug)]
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// How a finished operation went
#[derive(Debug, Clone, PartialEq)]
pub struct FlashOutcome {
    pub mode: FlashMode,
    pub result: std::result::Result<(), ToolError>,
    pub duration_ms: u64,
}

impl FlashOutcome {
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs flash plans against a `FlashTool`, one at a time
#[derive(Clone)]
pub struct FlashExecutor {
    tool: Arc<dyn FlashTool>,
    state: ExecutionState,
}

impl FlashExecutor {
    pub fn new(tool: Arc<dyn FlashTool>) -> Self {
        Self {
            tool,
            state: ExecutionState::new(),
        }
    }

    /// Executor gated by an existing flag, so several initiators stay
    /// single-flight together
    pub fn with_state(tool: Arc<dyn FlashTool>, state: ExecutionState) -> Self {
        Self { tool, state }
    }

    pub fn state(&self) -> ExecutionState {
        self.state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Start `plan` in the background.
    ///
    /// Fails with `Busy` without touching the tool if another plan is
    /// still running.
    pub fn start(
        &self,
        plan: FlashPlan,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<JoinHandle<FlashOutcome>> {
        let guard = match self.state.try_acquire() {
            Some(guard) => guard,
            None => {
                log::warn!("Rejected {} request: currently busy", plan.mode());
                return Err(FlasherError::Busy);
            }
        };

        let tool = self.tool.clone();
        Ok(tokio::spawn(async move {
            let _guard = guard;
            execute_plan(tool.as_ref(), plan, &events).await
        }))
    }

    /// Start `plan` and wait for it to finish
    pub async fn run(
        &self,
        plan: FlashPlan,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<FlashOutcome> {
        let mode = plan.mode();
        let handle = self.start(plan, events.clone())?;

        match handle.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // The task died before it could report; the guard was
                // dropped during unwinding so the flag is already clear.
                let error = ToolError::Unexpected(format!("flash task failed: {}", e));
                log::error!("{} operation aborted: {}", mode, error);
                let _ = events.send(AppEvent::Error(error.to_string()));
                let _ = events.send(AppEvent::OperationFinished(mode, false));
                Ok(FlashOutcome {
                    mode,
                    result: Err(error),
                    duration_ms: 0,
                })
            }
        }
    }
}

async fn execute_plan(
    tool: &dyn FlashTool,
    plan: FlashPlan,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> FlashOutcome {
    let start_time = Instant::now();
    let mode = plan.mode();
    let args = plan.arguments();

    log::info!(
        "Starting {} on port {} (chip {}, {} baud)",
        mode,
        plan.port(),
        plan.chip(),
        plan.baud()
    );
    for image in plan.images() {
        log::debug!("  {} -> {} ({})", image.address, image.path.display(), image.role);
    }

    let _ = events.send(AppEvent::OperationStarted(mode));
    let _ = events.send(AppEvent::Info("--- FLASH STARTED ---".to_string()));

    let result = tool.run(&args, events).await;
    let duration_ms = start_time.elapsed().as_millis() as u64;

    match &result {
        Ok(()) => {
            log::info!("{} finished successfully in {}ms", mode, duration_ms);
            let _ = events.send(AppEvent::Info("--- FINISHED SUCCESSFULLY ---".to_string()));
        }
        Err(error) => {
            log::error!("{} failed ({} error): {}", mode, error.kind(), error.message());
            let _ = events.send(AppEvent::Error(format!("--- ERROR ---\n{}", error.message())));
            if matches!(error, ToolError::Unexpected(_)) {
                let _ = events.send(AppEvent::Warning(UNEXPECTED_HINT.to_string()));
            }
        }
    }

    let _ = events.send(AppEvent::OperationFinished(mode, result.is_ok()));

    FlashOutcome {
        mode,
        result,
        duration_ms,
    }
}
