//! Settings-tree validation.
//!
//! Two phases: first the whole tree is checked against
//! [`schema::REQUIRED_SECTIONS`] and every structural violation is collected,
//! then each value is coerced into its typed form. A section that is present
//! but not a mapping is itself one violation; its keys are skipped while the
//! remaining sections continue to be checked.

use serde_yaml::Value;

use crate::error::{ConfigError, Result, SchemaViolation};
use crate::schema;
use crate::types::{AccelRange, RuntimeConfig};

/// Validate a raw settings tree and produce the typed runtime configuration.
pub fn validate(tree: &Value) -> Result<RuntimeConfig> {
    if !tree.is_mapping() {
        return Err(ConfigError::ParseError(
            "top-level document is not a key/value mapping".to_string(),
        ));
    }

    let violations = check_schema(tree);
    if !violations.is_empty() {
        return Err(ConfigError::Invalid(violations));
    }

    let sensor_address = coerce_address(tree, schema::MPU_SETTINGS, schema::I2C_ADDRESS)?;
    let knock_threshold =
        coerce_positive_f64(tree, schema::MPU_SETTINGS, schema::KNOCK_THRESHOLD)?;
    let accel_range = coerce_range(tree, schema::MPU_SETTINGS, schema::ACCELEROMETER_RANGE)?;

    let target_host = coerce_string(tree, schema::NETWORK_SETTINGS, schema::TARGET_HOST)?;
    let target_port = coerce_port(tree, schema::NETWORK_SETTINGS, schema::TARGET_PORT)?;
    let endpoint = coerce_string(tree, schema::NETWORK_SETTINGS, schema::ENDPOINT)?;

    let debounce_seconds =
        coerce_non_negative_f64(tree, schema::TIMING_SETTINGS, schema::DEBOUNCE_TIME_SECONDS)?;
    let safe_mode = coerce_bool(tree, schema::GENERAL_SETTINGS, schema::SAFE_MODE)?;

    let show_sub_threshold_motion = match tree
        .get(schema::DEBUG_SETTINGS)
        .and_then(|section| section.get(schema::SHOW_SUB_THRESHOLD_MOTION))
    {
        Some(_) => coerce_bool(tree, schema::DEBUG_SETTINGS, schema::SHOW_SUB_THRESHOLD_MOTION)?,
        None => false,
    };

    Ok(RuntimeConfig {
        sensor_address,
        knock_threshold,
        accel_range,
        target_url: format!("http://{target_host}:{target_port}{endpoint}"),
        debounce_seconds,
        safe_mode,
        show_sub_threshold_motion,
    })
}

fn check_schema(tree: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    for section in schema::REQUIRED_SECTIONS {
        match tree.get(section.name) {
            None => violations.push(SchemaViolation::MissingSection {
                section: section.name,
            }),
            Some(value) if !value.is_mapping() => {
                violations.push(SchemaViolation::MalformedSection {
                    section: section.name,
                });
            }
            Some(value) => {
                for &key in section.keys {
                    if value.get(key).is_none() {
                        violations.push(SchemaViolation::MissingKey {
                            section: section.name,
                            key,
                        });
                    }
                }
            }
        }
    }

    // The debug section is optional but must still be a mapping when present.
    if let Some(value) = tree.get(schema::DEBUG_SETTINGS) {
        if !value.is_mapping() {
            violations.push(SchemaViolation::MalformedSection {
                section: schema::DEBUG_SETTINGS,
            });
        }
    }

    violations
}

fn field(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}

fn value<'a>(tree: &'a Value, section: &str, key: &str) -> Result<&'a Value> {
    tree.get(section)
        .and_then(|s| s.get(key))
        .ok_or_else(|| ConfigError::TypeCoercion {
            field: field(section, key),
            reason: "value is missing".to_string(),
        })
}

/// Bus addresses may be written as integers or as base-prefixed strings
/// (`"0x68"`), and must fit in a byte.
fn coerce_address(tree: &Value, section: &str, key: &str) -> Result<u8> {
    let raw = value(tree, section, key)?;
    let err = || ConfigError::TypeCoercion {
        field: field(section, key),
        reason: "expected an integer bus address such as 0x68".to_string(),
    };

    if let Some(n) = raw.as_u64() {
        return u8::try_from(n).map_err(|_| err());
    }

    let text = raw.as_str().ok_or_else(err)?.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o") {
        u8::from_str_radix(oct, 8)
    } else if let Some(bin) = text.strip_prefix("0b") {
        u8::from_str_radix(bin, 2)
    } else {
        text.parse()
    };
    parsed.map_err(|_| err())
}

/// Upper bound for numeric settings. YAML `.inf` and out-of-scale values
/// must not reach `RuntimeConfig`; NaN already fails the ordering checks.
const MAX_NUMERIC_SETTING: f64 = 1.0e6;

fn coerce_positive_f64(tree: &Value, section: &str, key: &str) -> Result<f64> {
    let raw = value(tree, section, key)?;
    match raw.as_f64() {
        Some(n) if n > 0.0 && n <= MAX_NUMERIC_SETTING => Ok(n),
        _ => Err(ConfigError::TypeCoercion {
            field: field(section, key),
            reason: "expected a positive number no greater than 1000000".to_string(),
        }),
    }
}

fn coerce_non_negative_f64(tree: &Value, section: &str, key: &str) -> Result<f64> {
    let raw = value(tree, section, key)?;
    match raw.as_f64() {
        Some(n) if n >= 0.0 && n <= MAX_NUMERIC_SETTING => Ok(n),
        _ => Err(ConfigError::TypeCoercion {
            field: field(section, key),
            reason: "expected a non-negative number no greater than 1000000".to_string(),
        }),
    }
}

fn coerce_port(tree: &Value, section: &str, key: &str) -> Result<u16> {
    let raw = value(tree, section, key)?;
    let err = || ConfigError::TypeCoercion {
        field: field(section, key),
        reason: "expected a port number between 1 and 65535".to_string(),
    };

    let n = if let Some(n) = raw.as_u64() {
        n
    } else {
        raw.as_str()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(err)?
    };
    match u16::try_from(n) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(err()),
    }
}

fn coerce_bool(tree: &Value, section: &str, key: &str) -> Result<bool> {
    let raw = value(tree, section, key)?;
    raw.as_bool().ok_or_else(|| ConfigError::TypeCoercion {
        field: field(section, key),
        reason: "expected a boolean".to_string(),
    })
}

fn coerce_string(tree: &Value, section: &str, key: &str) -> Result<String> {
    let raw = value(tree, section, key)?;
    raw.as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::TypeCoercion {
            field: field(section, key),
            reason: "expected a string".to_string(),
        })
}

fn coerce_range(tree: &Value, section: &str, key: &str) -> Result<AccelRange> {
    let name = coerce_string(tree, section, key)?;
    AccelRange::parse(&name).ok_or_else(|| ConfigError::InvalidEnumValue {
        field: field(section, key),
        value: name.to_uppercase(),
        valid: AccelRange::VALID_NAMES.join(", "),
    })
}
