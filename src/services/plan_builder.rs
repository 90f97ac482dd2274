//! Turns the current selection into a validated flash plan

use crate::errors::{FlasherError, Result};
use crate::models::flash::{
    BaudRate, Chip, FlashMode, FlashPlan, FlashTarget, FlashTargets, PlannedImage, PortSelection,
};

/// Builds `FlashPlan`s, refusing incomplete selections
#[derive(Debug, Clone)]
pub struct FlashPlanBuilder {
    chip: Chip,
    baud: BaudRate,
    port: PortSelection,
}

impl FlashPlanBuilder {
    pub fn new(chip: Chip, baud: BaudRate, port: PortSelection) -> Self {
        Self { chip, baud, port }
    }

    /// Plan that wipes the whole flash. Target selection is ignored.
    pub fn erase(&self) -> FlashPlan {
        FlashPlan {
            mode: FlashMode::Erase,
            chip: self.chip,
            baud: self.baud,
            port: self.port.clone(),
            images: Vec::new(),
        }
    }

    /// Plan that writes every selected target, in fixed role order
    pub fn write(&self, targets: &FlashTargets) -> Result<FlashPlan> {
        let mut images = Vec::new();
        for target in targets.selected() {
            images.push(validate_target(target)?);
        }

        if images.is_empty() {
            return Err(FlasherError::Validation("nothing to do".to_string()));
        }

        Ok(FlashPlan {
            mode: FlashMode::Write,
            chip: self.chip,
            baud: self.baud,
            port: self.port.clone(),
            images,
        })
    }

    pub fn build(&self, mode: FlashMode, targets: &FlashTargets) -> Result<FlashPlan> {
        match mode {
            FlashMode::Erase => Ok(self.erase()),
            FlashMode::Write => self.write(targets),
        }
    }
}

fn validate_target(target: &FlashTarget) -> Result<PlannedImage> {
    let role = target.role;

    let path = match &target.file_path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => {
            return Err(FlasherError::Validation(format!(
                "no {} selected for flash",
                role.description()
            )));
        }
    };

    if !path.is_file() {
        return Err(FlasherError::Validation(format!(
            "{} file not found: {}",
            role.description(),
            path.display()
        )));
    }

    if !is_hex_address(&target.flash_address) {
        return Err(FlasherError::Validation(format!(
            "invalid {} flash address: {}",
            role.description(),
            target.flash_address
        )));
    }

    Ok(PlannedImage {
        role,
        address: target.flash_address.trim().to_string(),
        path: path.clone(),
    })
}

fn is_hex_address(address: &str) -> bool {
    let address = address.trim();
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"));
    match digits {
        Some(digits) => !digits.is_empty() && u32::from_str_radix(digits, 16).is_ok(),
        None => false,
    }
}
