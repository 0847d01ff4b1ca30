//! knockd: MPU-6050 knock detector daemon.
//!
//! Reads `config.yaml` from the working directory, validates it exhaustively,
//! initializes the sensor and then runs the detection loop until the process
//! is terminated. Every startup failure exits with code 1; once the loop is
//! running, nothing is fatal.

mod sensor;

use std::path::Path;

use anyhow::Context;
use tracing::{error, info, warn};

use detector_config::{providers, templates, validate, ConfigError, RuntimeConfig};
use knock_engine::{HttpNotifier, KnockDetector};

const CONFIG_FILE_NAME: &str = "config.yaml";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = load_config(Path::new(CONFIG_FILE_NAME))?;

    info!("starting MPU-6050 knock detector");
    if config.safe_mode {
        warn!("*** RUNNING IN SAFE MODE - NO ACTUAL POST REQUESTS WILL BE SENT ***");
    }
    info!("target URL: {}", config.target_url);
    info!("knock threshold: {} m/s^2 (on any axis)", config.knock_threshold);
    info!("accelerometer range: {}", config.accel_range.name());
    info!("debounce time: {}s", config.debounce_seconds);
    info!("MPU-6050 I2C address: {:#04x}", config.sensor_address);

    let source = sensor::Mpu6050Source::open(
        sensor::DEFAULT_I2C_BUS,
        config.sensor_address,
        config.accel_range,
    )
    .context("could not initialize the MPU-6050; check I2C wiring, the configured address, and that I2C is enabled")?;

    let notifier = HttpNotifier::new().context("could not build the HTTP client")?;

    KnockDetector::new(config, source, notifier).run().await;
    Ok(())
}

/// Load and validate the configuration. A missing file prints a ready-to-use
/// template before exiting, so first-time setup is a copy/paste away.
fn load_config(path: &Path) -> anyhow::Result<RuntimeConfig> {
    let tree = match providers::load_file(path) {
        Ok(tree) => tree,
        Err(ConfigError::MissingFile(name)) => {
            eprintln!("Configuration file '{name}' not found.");
            eprintln!("Please create it. You can use the following as a template:");
            println!("---");
            print!("{}", templates::render());
            println!("---");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let config = validate(&tree)?;
    info!("configuration loaded from '{}'", path.display());
    Ok(config)
}
