//! Utility functions and helpers used throughout esp-flasher

pub mod console;
pub mod esptool_utils;
pub mod logging;
pub mod serial_utils;
