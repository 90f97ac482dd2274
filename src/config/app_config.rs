//! Application configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{FlasherError, Result};
use crate::models::flash::{BaudRate, Chip, FlashRole};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults used when a flag is not given on the command line
    pub defaults: DefaultsConfig,
    /// Flash offsets per image role
    pub addresses: AddressConfig,
    /// External flashing tool invocation
    pub tool: ToolConfig,
}

/// Serial and chip defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub chip: Chip,
    pub baud: BaudRate,
    /// Serial port name, or "auto" to let the flashing tool detect it
    pub port: Option<String>,
}

/// Flash offsets, as hex strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    pub bootloader: String,
    pub partition_table: String,
    pub application: String,
    pub filesystem: String,
}

/// How to launch the flashing tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program to run, e.g. "esptool.py" or "python3"
    pub program: String,
    /// Arguments placed before the generated ones, e.g. ["-m", "esptool"]
    pub args: Vec<String>,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            bootloader: FlashRole::Bootloader.default_address().to_string(),
            partition_table: FlashRole::PartitionTable.default_address().to_string(),
            application: FlashRole::Application.default_address().to_string(),
            filesystem: FlashRole::FilesystemImage.default_address().to_string(),
        }
    }
}

impl AddressConfig {
    pub fn for_role(&self, role: FlashRole) -> &str {
        match role {
            FlashRole::Bootloader => &self.bootloader,
            FlashRole::PartitionTable => &self.partition_table,
            FlashRole::Application => &self.application,
            FlashRole::FilesystemImage => &self.filesystem,
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "esptool.py".to_string(),
            args: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Default location: `<config dir>/esp-flasher/config.toml`
    pub fn default_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir
        } else {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        };
        config_dir.join(crate::APP_NAME).join("config.toml")
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            FlasherError::Config(format!("{}: {}", path.display(), e))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tool.program, "esptool.py");
        assert_eq!(config.addresses.for_role(FlashRole::Application), "0x10000");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[defaults]
chip = "esp32c3"
baud = 115200

[tool]
program = "python3"
args = ["-m", "esptool"]
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.defaults.chip, Chip::Esp32c3);
        assert_eq!(config.defaults.baud, BaudRate::B115200);
        assert_eq!(config.tool.args, vec!["-m", "esptool"]);
        assert_eq!(config.addresses.bootloader, "0x1000");
    }

    #[test]
    fn test_unsupported_baud_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nbaud = 9600\n").unwrap();

        match AppConfig::load(&path) {
            Err(FlasherError::Config(msg)) => assert!(msg.contains("9600")),
            other => panic!("Expected config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.defaults.port = Some("/dev/ttyUSB0".to_string());
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }
}
