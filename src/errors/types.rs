//! Custom error types for esp-flasher

use std::fmt;

/// Main error type for esp-flasher operations
#[derive(Debug)]
pub enum FlasherError {
    /// An operation is already in flight
    Busy,
    /// Incomplete or invalid file/target selection
    Validation(String),
    /// Archive extraction or pattern matching errors
    Archive(String),
    /// Serial port open or control line errors
    Serial(String),
    /// Configuration related errors
    Config(String),
    /// General I/O errors
    Io(std::io::Error),
}

impl fmt::Display for FlasherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlasherError::Busy => write!(f, "currently busy"),
            FlasherError::Validation(msg) => write!(f, "Validation error: {}", msg),
            FlasherError::Archive(msg) => write!(f, "Archive error: {}", msg),
            FlasherError::Serial(msg) => write!(f, "Serial error: {}", msg),
            FlasherError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FlasherError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for FlasherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlasherError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FlasherError {
    fn from(err: std::io::Error) -> Self {
        FlasherError::Io(err)
    }
}

impl From<zip::result::ZipError> for FlasherError {
    fn from(err: zip::result::ZipError) -> Self {
        FlasherError::Archive(err.to_string())
    }
}

impl From<toml::de::Error> for FlasherError {
    fn from(err: toml::de::Error) -> Self {
        FlasherError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FlasherError {
    fn from(err: toml::ser::Error) -> Self {
        FlasherError::Config(err.to_string())
    }
}

/// Failure reported by the external flashing tool.
///
/// The three kinds are logged differently but all end the operation the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The tool reported a fatal error of its own
    Fatal(String),
    /// Serial transport failure while talking to the device
    Transport(String),
    /// Anything else, including failure to launch the tool
    Unexpected(String),
}

impl ToolError {
    /// Short label used when logging the failure
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Fatal(_) => "fatal",
            ToolError::Transport(_) => "transport",
            ToolError::Unexpected(_) => "unexpected",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ToolError::Fatal(msg) | ToolError::Transport(msg) | ToolError::Unexpected(msg) => msg,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::Fatal(msg) => write!(f, "Flash tool error: {}", msg),
            ToolError::Transport(msg) => write!(f, "Serial transport error: {}", msg),
            ToolError::Unexpected(msg) => write!(f, "Unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for ToolError {}

/// Result type alias for esp-flasher operations
pub type Result<T> = std::result::Result<T, FlasherError>;
