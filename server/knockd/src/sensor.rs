//! MPU-6050 accelerometer over Linux userspace I2C.
//!
//! The only hardware-aware code in the repository. Everything above this
//! module sees the [`AccelerometerSource`] seam and calibrated m/s^2 values.

use async_trait::async_trait;
use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use tracing::info;

use detector_config::AccelRange;
use knock_engine::{AccelSample, AccelerometerSource, SensorError};

/// Default I2C bus on a Raspberry Pi.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

const WHO_AM_I: u8 = 0x75;
const WHO_AM_I_VALUE: u8 = 0x68;
const PWR_MGMT_1: u8 = 0x6B;
const ACCEL_CONFIG: u8 = 0x1C;
const ACCEL_XOUT_H: u8 = 0x3B;

/// Standard gravity, m/s^2 per g.
const STANDARD_GRAVITY: f64 = 9.80665;

pub struct Mpu6050Source {
    device: LinuxI2CDevice,
    /// m/s^2 per raw LSB at the configured range.
    scale: f64,
}

impl Mpu6050Source {
    /// Open the bus, verify the device identity, wake the sensor and program
    /// the accelerometer range. Any failure here is fatal to startup.
    pub fn open(bus_path: &str, address: u8, range: AccelRange) -> Result<Self, SensorError> {
        let mut device = LinuxI2CDevice::new(bus_path, u16::from(address))
            .map_err(|err| map_open_error(bus_path, &err))?;

        let identity = device.smbus_read_byte_data(WHO_AM_I).map_err(|err| {
            SensorError::NotFound {
                address,
                details: format!("{err}; check wiring and run 'i2cdetect -y 1'"),
            }
        })?;
        if identity != WHO_AM_I_VALUE {
            return Err(SensorError::NotFound {
                address,
                details: format!("unexpected identity register value {identity:#04x}"),
            });
        }

        // Wake from sleep, then select the full-scale range via AFS_SEL.
        device
            .smbus_write_byte_data(PWR_MGMT_1, 0x00)
            .map_err(|err| SensorError::Bus(err.to_string()))?;
        device
            .smbus_write_byte_data(ACCEL_CONFIG, range.register_bits() << 3)
            .map_err(|err| SensorError::Bus(err.to_string()))?;

        info!(
            range = range.name(),
            "MPU-6050 initialized at address {address:#04x}"
        );

        Ok(Self {
            device,
            scale: STANDARD_GRAVITY / range.lsb_per_g(),
        })
    }

    fn read_axes(&mut self) -> Result<AccelSample, SensorError> {
        let mut raw = [0u8; 6];
        self.device
            .write(&[ACCEL_XOUT_H])
            .map_err(|err| SensorError::Read(err.to_string()))?;
        self.device
            .read(&mut raw)
            .map_err(|err| SensorError::Read(err.to_string()))?;

        let scale = self.scale;
        let axis = |hi: u8, lo: u8| f64::from(i16::from_be_bytes([hi, lo])) * scale;
        Ok(AccelSample::new(
            axis(raw[0], raw[1]),
            axis(raw[2], raw[3]),
            axis(raw[4], raw[5]),
        ))
    }
}

#[async_trait]
impl AccelerometerSource for Mpu6050Source {
    async fn read(&mut self) -> Result<AccelSample, SensorError> {
        // A single 6-byte burst; quick enough to stay inline on the task.
        self.read_axes()
    }
}

fn map_open_error(bus_path: &str, err: &LinuxI2CError) -> SensorError {
    if let LinuxI2CError::Io(io) = err {
        match io.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return SensorError::PermissionDenied(format!(
                    "'{bus_path}': add the user to the i2c group or run as root"
                ));
            }
            std::io::ErrorKind::NotFound => {
                return SensorError::Bus(format!(
                    "'{bus_path}' does not exist; is the I2C interface enabled?"
                ));
            }
            _ => {}
        }
    }
    SensorError::Bus(format!("'{bus_path}': {err}"))
}
