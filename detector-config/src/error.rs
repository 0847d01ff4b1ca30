use thiserror::Error;

/// A single schema violation found while checking the raw settings tree.
///
/// Violations are collected exhaustively so the user can repair the whole
/// file in one pass instead of replaying startup once per mistake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    MissingSection {
        section: &'static str,
    },
    MissingKey {
        section: &'static str,
        key: &'static str,
    },
    MalformedSection {
        section: &'static str,
    },
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaViolation::MissingSection { section } => {
                write!(f, "Section '{section}' is missing.")
            }
            SchemaViolation::MissingKey { section, key } => {
                write!(f, "Key '{key}' in section '{section}' is missing.")
            }
            SchemaViolation::MalformedSection { section } => {
                write!(
                    f,
                    "Section '{section}' is not correctly formatted (should be a key/value mapping)."
                )
            }
        }
    }
}

fn render_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file '{0}' not found")]
    MissingFile(String),

    #[error("configuration file '{0}' is empty")]
    EmptyFile(String),

    #[error("could not parse configuration: {0}")]
    ParseError(String),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration is missing required settings:\n{}", render_violations(.0))]
    Invalid(Vec<SchemaViolation>),

    #[error("invalid value for '{field}': '{value}' (valid values are: {valid})")]
    InvalidEnumValue {
        field: String,
        value: String,
        valid: String,
    },

    #[error("invalid value for '{field}': {reason}")]
    TypeCoercion { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
