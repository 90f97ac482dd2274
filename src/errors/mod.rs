//! Error types for esp-flasher

pub mod types;

pub use types::*;
