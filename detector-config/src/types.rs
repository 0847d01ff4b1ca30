use serde::{Deserialize, Serialize};

/// Accelerometer full-scale range supported by the MPU-6050.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccelRange {
    Range2G,
    Range4G,
    Range8G,
    Range16G,
}

impl AccelRange {
    /// Configuration names, in the order users see them in error output.
    pub const VALID_NAMES: [&'static str; 4] =
        ["RANGE_2_G", "RANGE_4_G", "RANGE_8_G", "RANGE_16_G"];

    /// Parse a configured range name. Matching is case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "RANGE_2_G" => Some(AccelRange::Range2G),
            "RANGE_4_G" => Some(AccelRange::Range4G),
            "RANGE_8_G" => Some(AccelRange::Range8G),
            "RANGE_16_G" => Some(AccelRange::Range16G),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AccelRange::Range2G => "RANGE_2_G",
            AccelRange::Range4G => "RANGE_4_G",
            AccelRange::Range8G => "RANGE_8_G",
            AccelRange::Range16G => "RANGE_16_G",
        }
    }

    /// Value for the AFS_SEL field of the MPU-6050 ACCEL_CONFIG register.
    pub fn register_bits(self) -> u8 {
        match self {
            AccelRange::Range2G => 0,
            AccelRange::Range4G => 1,
            AccelRange::Range8G => 2,
            AccelRange::Range16G => 3,
        }
    }

    /// Sensitivity in LSB per g at this range.
    pub fn lsb_per_g(self) -> f64 {
        match self {
            AccelRange::Range2G => 16384.0,
            AccelRange::Range4G => 8192.0,
            AccelRange::Range8G => 4096.0,
            AccelRange::Range16G => 2048.0,
        }
    }
}

/// Fully validated runtime configuration.
///
/// Constructed once by [`crate::validation::validate`] and never mutated; the
/// detection loop owns it for the process lifetime and performs no further
/// type or range checking.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// I2C bus address of the sensor.
    pub sensor_address: u8,
    /// Knock threshold in m/s^2, compared against absolute per-axis values.
    pub knock_threshold: f64,
    /// Accelerometer full-scale range.
    pub accel_range: AccelRange,
    /// Composed `http://{host}:{port}{endpoint}` target. Reachability is the
    /// notifier's concern, never checked at config time.
    pub target_url: String,
    /// Minimum spacing in seconds between two accepted detections.
    pub debounce_seconds: f64,
    /// When true, dispatch logs its intent instead of calling the network.
    pub safe_mode: bool,
    /// Verbose sub-threshold diagnostics; absent from the file means false.
    pub show_sub_threshold_motion: bool,
}
