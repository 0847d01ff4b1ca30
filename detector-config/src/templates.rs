//! Default configuration template.
//!
//! Printed when no configuration file exists, so the user can copy a working
//! starting point instead of reverse-engineering the schema from error
//! messages. The defaults here are real values: the rendered document itself
//! passes validation.

use serde::Serialize;

#[derive(Serialize)]
struct TemplateDocument {
    #[serde(rename = "MPUSettings")]
    mpu_settings: MpuSettings,
    #[serde(rename = "NetworkSettings")]
    network_settings: NetworkSettings,
    #[serde(rename = "TimingSettings")]
    timing_settings: TimingSettings,
    #[serde(rename = "GeneralSettings")]
    general_settings: GeneralSettings,
    #[serde(rename = "DebugSettings")]
    debug_settings: DebugSettings,
}

#[derive(Serialize)]
struct MpuSettings {
    i2c_address: &'static str,
    knock_threshold: f64,
    accelerometer_range: &'static str,
}

#[derive(Serialize)]
struct NetworkSettings {
    target_host: &'static str,
    target_port: u16,
    endpoint: &'static str,
}

#[derive(Serialize)]
struct TimingSettings {
    debounce_time_seconds: f64,
}

#[derive(Serialize)]
struct GeneralSettings {
    safe_mode: bool,
}

#[derive(Serialize)]
struct DebugSettings {
    show_sub_threshold_motion: bool,
}

fn document() -> TemplateDocument {
    TemplateDocument {
        mpu_settings: MpuSettings {
            // Default MPU-6050 address
            i2c_address: "0x68",
            knock_threshold: 20.0,
            accelerometer_range: "RANGE_2_G",
        },
        network_settings: NetworkSettings {
            target_host: "your_host_here",
            target_port: 5000,
            endpoint: "/your_endpoint",
        },
        timing_settings: TimingSettings {
            debounce_time_seconds: 1.5,
        },
        general_settings: GeneralSettings { safe_mode: true },
        debug_settings: DebugSettings {
            show_sub_threshold_motion: false,
        },
    }
}

/// Render the template as a YAML document.
#[allow(clippy::expect_used)] // serializing the static document cannot fail
pub fn render() -> String {
    serde_yaml::to_string(&document()).expect("static template serializes")
}
