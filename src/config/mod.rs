//! Configuration management for esp-flasher

pub mod app_config;

pub use app_config::*;
