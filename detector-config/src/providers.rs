//! Configuration sources.
//!
//! Only the local YAML file is supported; it is read once at startup and the
//! parsed tree is handed to [`crate::validation::validate`].

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Load the raw settings tree from a YAML file.
///
/// A missing file, an empty document and unparseable content are three
/// distinct fatal errors so the caller can react differently to each (the
/// missing-file case is the one that triggers template printing).
pub fn load_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    let tree: Value = serde_yaml::from_str(&raw)
        .map_err(|err| ConfigError::ParseError(format!("'{}': {err}", path.display())))?;

    if tree.is_null() {
        return Err(ConfigError::EmptyFile(path.display().to_string()));
    }

    debug!(path = %path.display(), "configuration file loaded");
    Ok(tree)
}
