//! Command line argument parsing

use crate::models::flash::{BaudRate, Chip};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "esp-flasher")]
#[command(about = "ESP Flasher Programming tool - erase and flash ESP chips through esptool")]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/esp-flasher/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Serial and chip options shared by flash and erase
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionArgs {
    /// Chip type (auto, esp8266, esp32, esp32s2, esp32s3, esp32c2, esp32c3, esp32c6)
    #[arg(long)]
    pub chip: Option<Chip>,

    /// Baud rate (115200, 230400, 460800 or 921600)
    #[arg(short, long)]
    pub baud: Option<BaudRate>,

    /// Serial port to use (e.g., /dev/ttyUSB0, COM3)
    #[arg(short, long, conflicts_with = "auto_port")]
    pub port: Option<String>,

    /// Let esptool auto-detect the serial port (slow)
    #[arg(long)]
    pub auto_port: bool,

    /// Write the console output of the run to this file
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,
}

/// Image selection for the flash command
#[derive(Args, Clone, Debug, Default)]
pub struct ImageArgs {
    /// Project zip containing bootloader_*.bin, partitions_*.bin, firmware_*.bin, spiffs_*.bin
    #[arg(short, long, value_name = "ZIP")]
    pub archive: Option<PathBuf>,

    /// Bootloader image
    #[arg(long, value_name = "BIN")]
    pub bootloader: Option<PathBuf>,

    /// Partition table image
    #[arg(long, value_name = "BIN")]
    pub partitions: Option<PathBuf>,

    /// Application image
    #[arg(long, value_name = "BIN")]
    pub app: Option<PathBuf>,

    /// SPIFFS data image
    #[arg(long, value_name = "BIN")]
    pub spiffs: Option<PathBuf>,

    /// Bootloader flash address (default 0x1000)
    #[arg(long, value_name = "HEX")]
    pub bootloader_addr: Option<String>,

    /// Partition table flash address (default 0x8000)
    #[arg(long, value_name = "HEX")]
    pub partitions_addr: Option<String>,

    /// Application flash address (default 0x10000)
    #[arg(long, value_name = "HEX")]
    pub app_addr: Option<String>,

    /// SPIFFS data flash address (default 0x290000)
    #[arg(long, value_name = "HEX")]
    pub spiffs_addr: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Write firmware images to the device
    Flash {
        #[command(flatten)]
        images: ImageArgs,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Erase the whole flash of the device
    Erase {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Reset the device by pulsing DTR/RTS
    Reset {
        /// Serial port of the device
        #[arg(short, long)]
        port: Option<String>,
    },
    /// List available serial ports
    Ports,
    /// Show the images a project archive provides, without flashing
    Inspect {
        /// Project zip file
        archive: PathBuf,
    },
    /// Write the default configuration file
    Config {
        /// Where to write it (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
