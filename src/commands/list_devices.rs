//! List available audio input devices.

use crate::devices::{CpalDeviceSource, DeviceSource};

/// Prints every input device with the index and name accepted by
/// `--device` and the `[audio] device` setting.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let mut source = CpalDeviceSource::new("default");
    let devices = source
        .enumerate()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    let default_device = source.preferred_device(&devices);

    println!();
    println!("Available audio input devices:");
    println!();

    for (index, device) in devices.iter().enumerate() {
        let default_indicator = if default_device.as_ref() == Some(&device.id) {
            " [DEFAULT]"
        } else {
            ""
        };

        let config_info = match source.default_config(&device.id) {
            Some((sample_rate, channels)) => format!(" ({sample_rate}Hz, {channels} channels)"),
            None => " (configuration unavailable)".to_string(),
        };

        println!("  ID: {}", index);
        println!("    Name: {}{}", device.label, default_indicator);
        println!("    Config:{}", config_info);
        println!();
    }

    Ok(())
}
