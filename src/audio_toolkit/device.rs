//! Input device enumeration and selection.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};

pub struct InputDeviceInfo {
    pub name: String,
    pub device: cpal::Device,
}

/// Enumerate input devices on the default host.
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .context("failed to enumerate input devices")?;

    Ok(devices
        .map(|device| {
            let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            InputDeviceInfo { name, device }
        })
        .collect())
}

/// Find an input device by case-insensitive substring match, or fall back
/// to the system default microphone.
pub fn select_input_device(name: Option<&str>) -> Result<cpal::Device> {
    match name {
        Some(wanted) => {
            let wanted_lower = wanted.to_lowercase();
            list_input_devices()?
                .into_iter()
                .find(|info| info.name.to_lowercase().contains(&wanted_lower))
                .map(|info| info.device)
                .ok_or_else(|| anyhow!("no input device matching '{wanted}'"))
        }
        None => cpal::default_host()
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device available")),
    }
}
