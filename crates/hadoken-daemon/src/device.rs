//! Device enumeration and selection

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evdev::Device;
use hadoken_config::{Config, DeviceConfig};

/// Information about an input device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub vendor: u16,
    pub product: u16,
}

impl DeviceInfo {
    fn from_device(path: &Path, device: &Device) -> Self {
        let id = device.input_id();
        Self {
            path: path.to_path_buf(),
            name: device.name().unwrap_or("Unknown").to_string(),
            vendor: id.vendor(),
            product: id.product(),
        }
    }

    /// Get vendor:product string (e.g., "3434:0361")
    pub fn vendor_product(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor, self.product)
    }
}

/// An opened keyboard selected for combo input
pub struct SelectedDevice {
    pub info: DeviceInfo,
    pub device: Device,
    pub grab: bool,
}

/// Open every keyboard under /dev/input
pub fn open_keyboards() -> Result<Vec<(DeviceInfo, Device)>> {
    let mut keyboards = Vec::new();

    for entry in std::fs::read_dir("/dev/input").context("Failed to read /dev/input")? {
        let entry = entry?;
        let path = entry.path();

        // Only look at event* devices
        if !path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("event"))
            .unwrap_or(false)
        {
            continue;
        }

        match Device::open(&path) {
            Ok(device) if is_keyboard(&device) => {
                keyboards.push((DeviceInfo::from_device(&path, &device), device));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(keyboards)
}

/// Check if a device is a keyboard
pub fn is_keyboard(device: &Device) -> bool {
    device
        .supported_events()
        .contains(evdev::EventType::KEY)
        && device
            .supported_keys()
            .map(|keys| keys.contains(evdev::Key::KEY_A))
            .unwrap_or(false)
}

/// Find the configuration entry a device matches.
///
/// With no devices configured every keyboard is accepted, without grabbing.
pub fn match_config<'a>(
    configured: &'a [DeviceConfig],
    info: &DeviceInfo,
) -> Option<Option<&'a DeviceConfig>> {
    if configured.is_empty() {
        return Some(None);
    }
    let vendor_product = info.vendor_product();
    configured
        .iter()
        .find(|c| c.matches(&info.name, &vendor_product))
        .map(Some)
}

/// Open and select the keyboards to read combos from
pub fn select_devices(config: &Config) -> Result<Vec<SelectedDevice>> {
    let mut selected = Vec::new();

    for (info, mut device) in open_keyboards()? {
        let Some(entry) = match_config(&config.devices, &info) else {
            tracing::debug!(
                "Keyboard '{}' ({}) does not match configuration, skipping",
                info.name,
                info.vendor_product()
            );
            continue;
        };

        let grab = entry.map(|c| c.grab).unwrap_or(false);
        if grab {
            grab_device(&mut device).with_context(|| {
                format!(
                    "Failed to grab device '{}' for exclusive access. \
                     Is another application using this device?",
                    info.name
                )
            })?;
            tracing::debug!("Grabbed device: {}", info.name);
        }

        tracing::info!(
            "Reading combos from '{}' (path: {})",
            info.name,
            info.path.display()
        );
        selected.push(SelectedDevice { info, device, grab });
    }

    Ok(selected)
}

/// Grab a device for exclusive access
pub fn grab_device(device: &mut Device) -> Result<()> {
    device.grab()?;
    Ok(())
}
