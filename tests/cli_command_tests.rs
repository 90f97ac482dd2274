//! CLI command tests for esp-flasher
//!
//! Runs the real binary with a throwaway configuration. On unix the
//! flashing tool is replaced by a small `sh -c` script so full flash and
//! erase runs can be checked without esptool or a device.


use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;
use test_fixtures::{ArchiveFixtures, ImageFixtures};

/// Captured result of one CLI run
pub struct CliResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl From<Output> for CliResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

fn execute_cli(config: &Path, args: &[&str]) -> CliResult {
    Command::new(env!("CARGO_BIN_EXE_esp-flasher"))
        .arg("--config")
        .arg(config)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run esp-flasher")
        .into()
}

/// Config whose flashing tool is `sh -c <script>`; generated arguments
/// arrive as `$@`
fn write_script_config(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "[tool]\nprogram = \"sh\"\nargs = [\"-c\", {:?}, \"esptool\"]\n",
        script
    );
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let result = execute_cli(&dir.path().join("none.toml"), &["--help"]);

    assert!(result.success);
    for command in ["flash", "erase", "reset", "ports", "inspect", "config"] {
        assert!(
            result.stdout.contains(command),
            "help output is missing {}",
            command
        );
    }
}

#[test]
fn test_inspect_shows_inferred_images() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixtures::create_archive(
        dir.path(),
        "bundle.zip",
        &["firmware_app.bin", "partitions_table.bin"],
    )
    .unwrap();

    let result = execute_cli(
        &dir.path().join("none.toml"),
        &["inspect", archive.to_str().unwrap()],
    );

    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("firmware_app.bin"));
    assert!(result.stdout.contains("partitions_table.bin"));
    assert!(result.stdout.contains("(not in archive)"));
}

#[test]
fn test_config_command_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out").join("config.toml");
    let config_arg = dir.path().join("none.toml");

    let result = execute_cli(&config_arg, &["config", "--output", target.to_str().unwrap()]);
    assert!(result.success, "stderr: {}", result.stderr);
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("esptool.py"));
    assert!(written.contains("0x10000"));

    let again = execute_cli(&config_arg, &["config", "--output", target.to_str().unwrap()]);
    assert!(!again.success);
    assert!(again.stderr.contains("--force"));
}

#[test]
fn test_flash_without_images_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = execute_cli(&dir.path().join("none.toml"), &["flash", "--auto-port"]);

    assert!(!result.success);
    assert!(result.stderr.contains("nothing to do"));
}

#[cfg(unix)]
#[test]
fn test_flash_runs_tool_with_generated_arguments() {
    let dir = TempDir::new().unwrap();
    let config = write_script_config(dir.path(), "echo \"ARGS: $*\"; printf 'Writing (10 %%)\\b\\b\\b\\b\\b99 %%)\\n'");
    let app = ImageFixtures::create_image(dir.path(), "app.bin", 64).unwrap();
    let transcript = dir.path().join("transcript.txt");

    let result = execute_cli(
        &config,
        &[
            "flash",
            "--app",
            app.to_str().unwrap(),
            "--port",
            "/dev/ttyFAKE0",
            "--chip",
            "esp32s3",
            "--transcript",
            transcript.to_str().unwrap(),
        ],
    );

    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains(
        "ARGS: --baud 921600 --chip esp32s3 --before default_reset --after hard_reset --port /dev/ttyFAKE0 write_flash 0x10000"
    ));
    assert!(result.stdout.contains("--- FINISHED SUCCESSFULLY ---"));

    let saved = std::fs::read_to_string(&transcript).unwrap();
    assert!(saved.contains("Writing (99 %)"));
    assert!(!saved.contains('\u{8}'));
}

#[cfg(unix)]
#[test]
fn test_tool_fatal_error_is_reported_not_crashed() {
    let dir = TempDir::new().unwrap();
    let config = write_script_config(
        dir.path(),
        "echo 'A fatal error occurred: Failed to connect to ESP32: No serial data received.'; exit 2",
    );

    let result = execute_cli(&config, &["erase", "--yes", "--auto-port"]);

    assert!(!result.success);
    assert!(result.stdout.contains("--- ERROR ---"));
    assert!(result.stdout.contains("Failed to connect to ESP32"));
    assert!(!result.stderr.contains("panicked"));
}
