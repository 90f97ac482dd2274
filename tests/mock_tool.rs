//! Mock flashing tool
//!
//! Stands in for esptool so the executor can be exercised without a device
//! or a Python installation. Every invocation is recorded.

use async_trait::async_trait;
use esp_flasher::models::AppEvent;
use esp_flasher::services::ExecutionState;
use esp_flasher::utils::esptool_utils::FlashTool;
use esp_flasher::ToolError;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

/// What the mock does when it is run
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Emit the chunks and succeed
    Succeed(Vec<String>),
    /// Emit the chunks and fail with the error
    Fail(Vec<String>, ToolError),
    /// Panic inside the tool call
    Panic,
}

#[derive(Clone)]
pub struct MockFlashTool {
    behavior: MockBehavior,
    invocations: Arc<Mutex<Vec<Vec<String>>>>,
    /// When set, each run waits for a notification before finishing
    gate: Option<Arc<Notify>>,
    /// When set, the busy flag seen from inside the run is recorded
    observed_state: Option<ExecutionState>,
    busy_during_run: Arc<Mutex<Vec<bool>>>,
}

impl MockFlashTool {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            invocations: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            observed_state: None,
            busy_during_run: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(MockBehavior::Succeed(vec![
            "Connecting....\n".to_string(),
            "Chip is ESP32-D0WD-V3 (revision v3.1)\n".to_string(),
            "Writing at 0x00010000... (100 %)\n".to_string(),
            "Hard resetting via RTS pin...\n".to_string(),
        ]))
    }

    pub fn failing(error: ToolError) -> Self {
        Self::new(MockBehavior::Fail(vec!["Connecting....\n".to_string()], error))
    }

    /// Block each run until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Record the busy flag from inside each run
    pub fn observing(mut self, state: ExecutionState) -> Self {
        self.observed_state = Some(state);
        self
    }

    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    pub fn busy_during_run(&self) -> Vec<bool> {
        self.busy_during_run.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlashTool for MockFlashTool {
    async fn run(
        &self,
        args: &[String],
        output: &mpsc::UnboundedSender<AppEvent>,
    ) -> Result<(), ToolError> {
        self.invocations.lock().unwrap().push(args.to_vec());

        if let Some(state) = &self.observed_state {
            self.busy_during_run.lock().unwrap().push(state.is_busy());
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.behavior {
            MockBehavior::Succeed(chunks) => {
                for chunk in chunks {
                    let _ = output.send(AppEvent::ToolOutput(chunk.clone()));
                }
                Ok(())
            }
            MockBehavior::Fail(chunks, error) => {
                for chunk in chunks {
                    let _ = output.send(AppEvent::ToolOutput(chunk.clone()));
                }
                Err(error.clone())
            }
            MockBehavior::Panic => panic!("mock flashing tool crashed"),
        }
    }
}

/// Collect everything currently queued on the event channel
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
