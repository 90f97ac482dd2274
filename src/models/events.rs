//! Application events for CLI operations

use crate::models::flash::FlashMode;

/// Events emitted while an operation runs, consumed by the console
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    // Operation lifecycle
    OperationStarted(FlashMode),
    OperationFinished(FlashMode, bool), // mode, success

    /// Raw output chunk from the flashing tool, may contain backspaces
    ToolOutput(String),

    // User feedback
    Error(String),
    Warning(String),
    Info(String),
}
