use async_trait::async_trait;

use crate::error::SensorError;
use crate::types::AccelSample;

/// Pull-based accelerometer collaborator.
///
/// Bus wiring and register programming live behind this seam; the detection
/// loop only ever sees calibrated m/s^2 triples. Implementations are expected
/// to be constructed (and to fail loudly) before the loop starts — a read
/// error after that is treated as transient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccelerometerSource: Send {
    /// Read one sample from the sensor.
    async fn read(&mut self) -> Result<AccelSample, SensorError>;
}
