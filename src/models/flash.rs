//! Flash-related data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Conventional firmware image roles, each with its own flash offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashRole {
    Bootloader,
    PartitionTable,
    Application,
    FilesystemImage,
}

impl FlashRole {
    /// Order in which images are passed to `write_flash`
    pub const ORDER: [FlashRole; 4] = [
        FlashRole::Bootloader,
        FlashRole::PartitionTable,
        FlashRole::Application,
        FlashRole::FilesystemImage,
    ];

    pub fn default_address(&self) -> &'static str {
        match self {
            FlashRole::Bootloader => "0x1000",
            FlashRole::PartitionTable => "0x8000",
            FlashRole::Application => "0x10000",
            FlashRole::FilesystemImage => "0x290000",
        }
    }

    /// Filename pattern used to recognise this role inside a project archive
    pub fn archive_pattern(&self) -> &'static str {
        match self {
            FlashRole::Bootloader => "bootloader_*.bin",
            FlashRole::PartitionTable => "partitions_*.bin",
            FlashRole::Application => "firmware_*.bin",
            FlashRole::FilesystemImage => "spiffs_*.bin",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlashRole::Bootloader => "bootloader",
            FlashRole::PartitionTable => "partition table",
            FlashRole::Application => "app",
            FlashRole::FilesystemImage => "spiffs file",
        }
    }

    fn index(&self) -> usize {
        match self {
            FlashRole::Bootloader => 0,
            FlashRole::PartitionTable => 1,
            FlashRole::Application => 2,
            FlashRole::FilesystemImage => 3,
        }
    }
}

impl fmt::Display for FlashRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlashRole::Bootloader => "Bootloader",
            FlashRole::PartitionTable => "Partition Table",
            FlashRole::Application => "Application",
            FlashRole::FilesystemImage => "Spiffs data",
        };
        write!(f, "{}", name)
    }
}

/// One firmware image slot: which file goes where, and whether to write it
#[derive(Debug, Clone, PartialEq)]
pub struct FlashTarget {
    pub role: FlashRole,
    pub file_path: Option<PathBuf>,
    /// Flash offset as given by the user, e.g. `0x10000`
    pub flash_address: String,
    pub selected: bool,
}

impl FlashTarget {
    pub fn new(role: FlashRole) -> Self {
        Self {
            role,
            file_path: None,
            flash_address: role.default_address().to_string(),
            selected: false,
        }
    }
}

/// The four image slots, always kept in `FlashRole::ORDER`
#[derive(Debug, Clone, PartialEq)]
pub struct FlashTargets {
    targets: [FlashTarget; 4],
}

impl FlashTargets {
    pub fn new() -> Self {
        Self {
            targets: FlashRole::ORDER.map(FlashTarget::new),
        }
    }

    pub fn get(&self, role: FlashRole) -> &FlashTarget {
        &self.targets[role.index()]
    }

    pub fn get_mut(&mut self, role: FlashRole) -> &mut FlashTarget {
        &mut self.targets[role.index()]
    }

    /// Point a role at a file and mark it for flashing
    pub fn select_file(&mut self, role: FlashRole, path: impl Into<PathBuf>) {
        let target = self.get_mut(role);
        target.file_path = Some(path.into());
        target.selected = true;
    }

    pub fn set_address(&mut self, role: FlashRole, address: impl Into<String>) {
        self.get_mut(role).flash_address = address.into();
    }

    pub fn deselect(&mut self, role: FlashRole) {
        self.get_mut(role).selected = false;
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlashTarget> {
        self.targets.iter()
    }

    pub fn selected(&self) -> impl Iterator<Item = &FlashTarget> {
        self.targets.iter().filter(|t| t.selected)
    }
}

impl Default for FlashTargets {
    fn default() -> Self {
        Self::new()
    }
}

/// What the external tool is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashMode {
    Erase,
    Write,
}

impl FlashMode {
    pub fn subcommand(&self) -> &'static str {
        match self {
            FlashMode::Erase => "erase_flash",
            FlashMode::Write => "write_flash",
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashMode::Erase => write!(f, "erase"),
            FlashMode::Write => write!(f, "flash"),
        }
    }
}

/// Chip ids understood by the flashing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chip {
    Auto,
    Esp8266,
    #[default]
    Esp32,
    Esp32s2,
    Esp32s3,
    Esp32c2,
    Esp32c3,
    Esp32c6,
}

impl Chip {
    pub const ALL: [Chip; 8] = [
        Chip::Auto,
        Chip::Esp8266,
        Chip::Esp32,
        Chip::Esp32s2,
        Chip::Esp32s3,
        Chip::Esp32c2,
        Chip::Esp32c3,
        Chip::Esp32c6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chip::Auto => "auto",
            Chip::Esp8266 => "esp8266",
            Chip::Esp32 => "esp32",
            Chip::Esp32s2 => "esp32s2",
            Chip::Esp32s3 => "esp32s3",
            Chip::Esp32c2 => "esp32c2",
            Chip::Esp32c3 => "esp32c3",
            Chip::Esp32c6 => "esp32c6",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chip {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Chip::ALL
            .into_iter()
            .find(|chip| chip.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Chip::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown chip '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Serial baud rates offered for flashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B115200,
    B230400,
    B460800,
    #[default]
    B921600,
}

impl BaudRate {
    pub const ALL: [BaudRate; 4] = [
        BaudRate::B115200,
        BaudRate::B230400,
        BaudRate::B460800,
        BaudRate::B921600,
    ];

    pub fn value(&self) -> u32 {
        match self {
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
            BaudRate::B460800 => 460_800,
            BaudRate::B921600 => 921_600,
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        baud.value()
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|b| b.value() == value)
            .ok_or_else(|| {
                format!(
                    "unsupported baud rate {}, expected 115200, 230400, 460800 or 921600",
                    value
                )
            })
    }
}

impl FromStr for BaudRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid baud rate '{}'", s))?;
        BaudRate::try_from(value)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Serial port choice; `Auto` leaves port detection to the flashing tool
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortSelection {
    #[default]
    Auto,
    Named(String),
}

impl PortSelection {
    pub fn name(&self) -> Option<&str> {
        match self {
            PortSelection::Auto => None,
            PortSelection::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for PortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSelection::Auto => write!(f, "auto"),
            PortSelection::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A single `(address, path)` pair passed to `write_flash`
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedImage {
    pub role: FlashRole,
    pub address: String,
    pub path: PathBuf,
}

/// A validated invocation of the flashing tool.
///
/// Only `FlashPlanBuilder` constructs these, so a plan in hand has already
/// passed selection checks.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashPlan {
    pub(crate) mode: FlashMode,
    pub(crate) chip: Chip,
    pub(crate) baud: BaudRate,
    pub(crate) port: PortSelection,
    pub(crate) images: Vec<PlannedImage>,
}

impl FlashPlan {
    pub fn mode(&self) -> FlashMode {
        self.mode
    }

    pub fn chip(&self) -> Chip {
        self.chip
    }

    pub fn baud(&self) -> BaudRate {
        self.baud
    }

    pub fn port(&self) -> &PortSelection {
        &self.port
    }

    pub fn images(&self) -> &[PlannedImage] {
        &self.images
    }

    /// Render the plan as command line arguments for the flashing tool
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "--baud".to_string(),
            self.baud.to_string(),
            "--chip".to_string(),
            self.chip.to_string(),
            "--before".to_string(),
            "default_reset".to_string(),
            "--after".to_string(),
            "hard_reset".to_string(),
        ];

        if let PortSelection::Named(port) = &self.port {
            args.push("--port".to_string());
            args.push(port.clone());
        }

        args.push(self.mode.subcommand().to_string());

        if self.mode == FlashMode::Write {
            for image in &self.images {
                args.push(image.address.clone());
                args.push(image.path.to_string_lossy().into_owned());
            }
        }

        args
    }
}
