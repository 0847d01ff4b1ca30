//! Knock detection engine
//!
//! Turns a stream of raw accelerometer samples into debounced, policy-gated
//! outbound notifications. The engine owns the only mutable state in the
//! process ([`DetectorState`]) and runs as a single sequential task: sample,
//! classify, gate, dispatch, pause. Its two collaborators are opaque seams:
//!
//! - [`AccelerometerSource`] pulls calibrated m/s^2 triples; bus wiring lives
//!   behind it
//! - [`Notifier`] performs the bare HTTP POST; [`HttpNotifier`] is the
//!   production implementation
//!
//! All runtime failures are handled at the iteration where they occur: sensor
//! read errors pause and retry, dispatch failures are logged and never
//! retried. Nothing escalates past the loop once it has started.

pub mod detector;
pub mod error;
pub mod notifier;
pub mod source;
pub mod types;

pub use detector::KnockDetector;
pub use error::{NotifyError, SensorError};
pub use notifier::{HttpNotifier, Notifier};
pub use source::AccelerometerSource;
pub use types::{AccelSample, DetectorState, NotifyResponse, SampleDecision, SubThresholdDiagnostic};
