//! Hardware reset through the serial control lines

use std::time::Duration;
use tokio_serial::{SerialPort, SerialStream};

use crate::errors::{FlasherError, Result};

const RESET_PULSE: Duration = Duration::from_millis(100);

/// The two modem control lines wired to EN/IO0 on common dev boards
pub trait ControlLines {
    fn set_dtr(&mut self, level: bool) -> Result<()>;
    fn set_rts(&mut self, level: bool) -> Result<()>;
}

impl ControlLines for SerialStream {
    fn set_dtr(&mut self, level: bool) -> Result<()> {
        self.write_data_terminal_ready(level)
            .map_err(|e| FlasherError::Serial(format!("Failed to set DTR: {}", e)))
    }

    fn set_rts(&mut self, level: bool) -> Result<()> {
        self.write_request_to_send(level)
            .map_err(|e| FlasherError::Serial(format!("Failed to set RTS: {}", e)))
    }
}

/// DTR=false/RTS=true, wait, then RTS=true/DTR=true
pub async fn pulse_reset<L: ControlLines + ?Sized>(lines: &mut L) -> Result<()> {
    lines.set_dtr(false)?;
    lines.set_rts(true)?;

    tokio::time::sleep(RESET_PULSE).await;

    lines.set_rts(true)?;
    lines.set_dtr(true)?;
    Ok(())
}

/// Open `port`, pulse the reset sequence and close it again
pub async fn reset_device(port: &str) -> Result<()> {
    let builder = tokio_serial::new(port, 115_200).timeout(Duration::from_secs(1));

    let mut serial = SerialStream::open(&builder)
        .map_err(|e| FlasherError::Serial(format!("Failed to open serial port {}: {}", port, e)))?;

    log::info!("reset device connected on port {}", port);
    pulse_reset(&mut serial).await?;
    drop(serial);

    log::debug!("Reset sequence completed for port {}", port);
    Ok(())
}
