//! esp-flasher - ESP Flasher Programming tool
//!
//! Erases and flashes ESP8266/ESP32 family chips by driving the external
//! `esptool` program. Firmware images can be given one by one or as a
//! project zip whose images are recognised by filename.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;

/// esp-flasher version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// esp-flasher application name
pub const APP_NAME: &str = "esp-flasher";
