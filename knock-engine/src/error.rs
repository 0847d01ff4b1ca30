use thiserror::Error;

/// Failures of the accelerometer collaborator.
///
/// Initialization variants are fatal at startup; `Read` is transient and the
/// loop retries it after a pause.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("no accelerometer responding at address {address:#04x}: {details}")]
    NotFound { address: u8, details: String },

    #[error("I2C bus unavailable: {0}")]
    Bus(String),

    #[error("permission denied opening the I2C bus: {0}")]
    PermissionDenied(String),

    #[error("sensor read failed: {0}")]
    Read(String),
}

/// Failures of the notifier collaborator. Always recovered locally: a failed
/// delivery is logged and the loop keeps sampling.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),
}
