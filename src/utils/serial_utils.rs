//! Serial port discovery

use anyhow::Result;

/// List serial device names, sorted the same way on every call
pub fn list_serial_devices() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    let devices = sorted_device_names(ports.into_iter().map(|p| p.port_name));
    log::debug!("Found {} serial ports", devices.len());
    Ok(devices)
}

/// First available device, used when no port was chosen explicitly
pub fn first_serial_device() -> Option<String> {
    match list_serial_devices() {
        Ok(devices) => devices.into_iter().next(),
        Err(e) => {
            log::warn!("Failed to enumerate serial ports: {}", e);
            None
        }
    }
}

fn sorted_device_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut devices: Vec<String> = names.collect();
    devices.sort();
    devices.dedup();
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_names_are_sorted() {
        let names = vec![
            "/dev/ttyUSB1".to_string(),
            "/dev/ttyACM0".to_string(),
            "/dev/ttyUSB0".to_string(),
        ];
        assert_eq!(
            sorted_device_names(names.into_iter()),
            vec!["/dev/ttyACM0", "/dev/ttyUSB0", "/dev/ttyUSB1"]
        );
    }
}
