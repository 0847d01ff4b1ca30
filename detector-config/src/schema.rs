//! The required configuration schema, declared as data.
//!
//! Adding a section or key is a change to [`REQUIRED_SECTIONS`], not to the
//! validation control flow.

pub const MPU_SETTINGS: &str = "MPUSettings";
pub const I2C_ADDRESS: &str = "i2c_address";
pub const KNOCK_THRESHOLD: &str = "knock_threshold";
pub const ACCELEROMETER_RANGE: &str = "accelerometer_range";

pub const NETWORK_SETTINGS: &str = "NetworkSettings";
pub const TARGET_HOST: &str = "target_host";
pub const TARGET_PORT: &str = "target_port";
pub const ENDPOINT: &str = "endpoint";

pub const TIMING_SETTINGS: &str = "TimingSettings";
pub const DEBOUNCE_TIME_SECONDS: &str = "debounce_time_seconds";

pub const GENERAL_SETTINGS: &str = "GeneralSettings";
pub const SAFE_MODE: &str = "safe_mode";

/// Optional section gating verbose sub-threshold diagnostics.
pub const DEBUG_SETTINGS: &str = "DebugSettings";
pub const SHOW_SUB_THRESHOLD_MOTION: &str = "show_sub_threshold_motion";

/// One required section and the keys it must contain.
pub struct SectionSchema {
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

/// Every section here must be present and shaped as a key/value mapping.
pub const REQUIRED_SECTIONS: &[SectionSchema] = &[
    SectionSchema {
        name: MPU_SETTINGS,
        keys: &[I2C_ADDRESS, KNOCK_THRESHOLD, ACCELEROMETER_RANGE],
    },
    SectionSchema {
        name: NETWORK_SETTINGS,
        keys: &[TARGET_HOST, TARGET_PORT, ENDPOINT],
    },
    SectionSchema {
        name: TIMING_SETTINGS,
        keys: &[DEBOUNCE_TIME_SECONDS],
    },
    SectionSchema {
        name: GENERAL_SETTINGS,
        keys: &[SAFE_MODE],
    },
];
