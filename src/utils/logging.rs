//! Logging utilities and initialization for esp-flasher

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Map `-q` / `-v` flags to a log level
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize logging for the CLI.
///
/// Diagnostics go to stderr so that flashing tool output on stdout stays
/// clean.
pub fn init_cli_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);

    Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init()?;

    // Initialize panic logging
    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("esp-flasher logging initialized with level: {:?}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_selection() {
        assert_eq!(level_for(0, true), LevelFilter::Error);
        assert_eq!(level_for(3, true), LevelFilter::Error);
        assert_eq!(level_for(0, false), LevelFilter::Info);
        assert_eq!(level_for(1, false), LevelFilter::Debug);
        assert_eq!(level_for(2, false), LevelFilter::Trace);
    }
}
