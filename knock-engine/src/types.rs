use std::time::{Duration, Instant};

/// One accelerometer reading, in m/s^2 per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Largest absolute single-axis magnitude.
    pub fn max_abs_axis(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    /// True when any axis strictly exceeds `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.x.abs() > threshold || self.y.abs() > threshold || self.z.abs() > threshold
    }
}

/// Mutable loop state, owned exclusively by the detection task.
#[derive(Debug, Clone)]
pub struct DetectorState {
    /// Earliest instant at which the next candidate knock may be accepted.
    /// `None` until the first acceptance; it only ever moves forward.
    ///
    /// This single field carries both the debounce gate and the post-dispatch
    /// cool-down: no candidate is accepted, and no network call issued,
    /// before it is reached.
    pub next_eligible_at: Option<Instant>,

    /// Magnitude reported by the most recent sub-threshold diagnostic, used
    /// to decide whether a new line differs enough to be worth printing.
    pub last_sub_threshold_max: f64,
}

impl DetectorState {
    pub fn new() -> Self {
        Self {
            next_eligible_at: None,
            last_sub_threshold_max: 0.0,
        }
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of classifying one sample against the threshold and the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleDecision {
    /// Candidate knock accepted; dispatch follows.
    Accepted,
    /// Candidate knock arrived before the gate reopened.
    Suppressed { remaining: Duration },
    /// Below threshold, optionally worth a diagnostic line.
    SubThreshold {
        diagnostic: Option<SubThresholdDiagnostic>,
    },
}

/// Variants of the verbose sub-threshold diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubThresholdDiagnostic {
    /// Motion changed noticeably since the last reported line.
    Notable,
    /// Motion within 80% of the knock threshold; reported more prominently
    /// and followed by a longer readability pause.
    NearThreshold,
}

/// Response surface of the notifier collaborator.
#[derive(Debug, Clone)]
pub struct NotifyResponse {
    pub status: u16,
    pub body: String,
}

impl NotifyResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
