//! Audio input device enumeration

use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

/// One enumerated audio input device
#[derive(Debug, Clone)]
pub struct InputDevice {
    /// Position in the host's device list; usable as `voice.input_device`
    pub index: usize,
    /// Device name as reported by the host
    pub name: String,
    /// Whether this is the system default input
    pub is_default: bool,
}

/// Enumerate the host's audio input devices
///
/// # Errors
///
/// Returns error if the audio host cannot list devices
pub fn list_input_devices() -> Result<Vec<InputDevice>> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| Error::Audio(e.to_string()))?
        .enumerate()
        .map(|(index, device)| {
            let name = device
                .name()
                .unwrap_or_else(|_| format!("<unknown device {index}>"));
            let is_default = default_name.as_deref() == Some(name.as_str());
            InputDevice {
                index,
                name,
                is_default,
            }
        })
        .collect();

    Ok(devices)
}
