//! Data models and types used throughout esp-flasher

pub mod events;
pub mod flash;

// Re-export commonly used types
pub use events::*;
pub use flash::*;
