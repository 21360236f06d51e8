//! Audio output diagnostics.

use cpal::traits::{DeviceTrait, HostTrait};

/// Prints every host's output devices and their default configuration.
pub fn log_audio_info() {
    println!("\n=== Audio Output Diagnostics ===\n");

    for host_id in cpal::available_hosts() {
        println!("--- Host: {:?} ---", host_id);

        let host = match cpal::host_from_id(host_id) {
            Ok(host) => host,
            Err(e) => {
                println!("  unavailable: {}", e);
                continue;
            }
        };

        let devices = match host.output_devices() {
            Ok(devices) => devices,
            Err(e) => {
                println!("  no output devices: {}", e);
                continue;
            }
        };

        for device in devices {
            let name = device.name().unwrap_or_else(|_| "unknown".into());
            match device.default_output_config() {
                Ok(config) => println!(
                    "  {}: {} ch @ {} Hz ({:?})",
                    name,
                    config.channels(),
                    config.sample_rate().0,
                    config.sample_format()
                ),
                Err(_) => println!("  {}: no default output config", name),
            }
        }
    }

    println!();
}
