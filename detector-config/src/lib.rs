//! Configuration loading and validation for the knockd daemon
//!
//! This crate turns the raw `config.yaml` settings tree into a fully typed,
//! immutable [`RuntimeConfig`]. Everything the detection loop needs is
//! validated here, exhaustively, before the loop ever starts:
//!
//! - Required sections and keys are declared once, as data, in [`schema`]
//! - Missing sections/keys are collected and reported together, not one
//!   startup attempt at a time
//! - Type coercions (hex bus address, threshold, range enumeration, flags)
//!   fail with the offending `Section.key` named
//!
//! The crate performs no I/O beyond [`providers::load_file`]; validation
//! itself only walks the already-parsed tree.

pub mod error;
pub mod providers;
pub mod schema;
pub mod templates;
pub mod types;
pub mod validation;

pub use error::{ConfigError, Result, SchemaViolation};
pub use types::{AccelRange, RuntimeConfig};
pub use validation::validate;
