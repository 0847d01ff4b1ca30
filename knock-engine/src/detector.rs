//! The detection-and-dispatch loop.
//!
//! Each iteration is strictly sequential: pull one sample, classify it,
//! apply the debounce gate, dispatch if accepted, then pause. The gate is a
//! single "next eligible detection time" advanced on acceptance, which covers
//! both suppression of early candidates and the post-dispatch cool-down
//! without a dedicated blocking sleep.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use detector_config::RuntimeConfig;

use crate::notifier::Notifier;
use crate::source::AccelerometerSource;
use crate::types::{AccelSample, DetectorState, SampleDecision, SubThresholdDiagnostic};

/// Pause between ordinary sampling iterations (bus/CPU load bound).
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(20);

/// Pause after a failed sensor read before the next attempt.
pub const READ_RETRY_PAUSE: Duration = Duration::from_secs(1);

// Sub-threshold diagnostic tuning. These are tuned-by-feel values, kept as
// named constants rather than intrinsic algorithm parameters.

/// Minimum magnitude (m/s^2) before a sub-threshold line is considered.
pub const DIAG_MIN_MAGNITUDE: f64 = 1.0;
/// Change from the last reported magnitude (m/s^2) that makes a new line
/// worth printing.
pub const DIAG_DELTA: f64 = 1.0;
/// Fraction of the knock threshold above which motion is always reported.
pub const DIAG_NOTABLE_RATIO: f64 = 0.7;
/// Fraction of the knock threshold above which the near-threshold variant
/// fires.
pub const DIAG_NEAR_RATIO: f64 = 0.8;
/// Readability pause after an ordinary diagnostic line.
pub const DIAG_PAUSE: Duration = Duration::from_millis(250);
/// Readability pause after a near-threshold diagnostic line.
pub const DIAG_NEAR_PAUSE: Duration = Duration::from_millis(750);

/// Classify one sample and advance the debounce gate.
///
/// Pure apart from `state`; the caller supplies `now`, which keeps every
/// decision replayable in tests. Replaying an identical sample/time sequence
/// against a fresh state yields an identical decision sequence.
pub fn decide(
    state: &mut DetectorState,
    sample: &AccelSample,
    threshold: f64,
    debounce: Duration,
    diagnostics_enabled: bool,
    now: Instant,
) -> SampleDecision {
    if sample.exceeds(threshold) {
        if let Some(eligible_at) = state.next_eligible_at {
            if now < eligible_at {
                return SampleDecision::Suppressed {
                    remaining: eligible_at - now,
                };
            }
        }
        state.next_eligible_at = Some(now + debounce);
        return SampleDecision::Accepted;
    }

    let max_abs = sample.max_abs_axis();
    let mut diagnostic = None;
    if diagnostics_enabled && max_abs > DIAG_MIN_MAGNITUDE {
        let delta = (max_abs - state.last_sub_threshold_max).abs();
        if delta > DIAG_DELTA || max_abs > DIAG_NOTABLE_RATIO * threshold {
            state.last_sub_threshold_max = max_abs;
            diagnostic = if max_abs > DIAG_NEAR_RATIO * threshold {
                Some(SubThresholdDiagnostic::NearThreshold)
            } else {
                Some(SubThresholdDiagnostic::Notable)
            };
        }
    }

    SampleDecision::SubThreshold { diagnostic }
}

/// The detection loop. Owns the runtime configuration, the mutable detector
/// state and both collaborators for the process lifetime.
pub struct KnockDetector<S, N> {
    config: RuntimeConfig,
    debounce: Duration,
    state: DetectorState,
    source: S,
    notifier: N,
}

impl<S: AccelerometerSource, N: Notifier> KnockDetector<S, N> {
    pub fn new(config: RuntimeConfig, source: S, notifier: N) -> Self {
        let debounce = Duration::from_secs_f64(config.debounce_seconds);
        Self {
            config,
            debounce,
            state: DetectorState::new(),
            source,
            notifier,
        }
    }

    /// Run until the process is terminated. There is no graceful-shutdown
    /// protocol; cancellation is external.
    pub async fn run(mut self) {
        info!("monitoring for knocks");
        loop {
            let pause = self.step().await;
            tokio::time::sleep(pause).await;
        }
    }

    /// One iteration: sample, classify, gate, dispatch. Returns the pause to
    /// apply before the next sample. Never fails — every error is handled
    /// here, at the iteration where it occurred.
    async fn step(&mut self) -> Duration {
        let sample = match self.source.read().await {
            Ok(sample) => sample,
            Err(err) => {
                warn!("sensor read failed: {err}; retrying shortly");
                return READ_RETRY_PAUSE;
            }
        };

        let decision = decide(
            &mut self.state,
            &sample,
            self.config.knock_threshold,
            self.debounce,
            self.config.show_sub_threshold_motion,
            Instant::now(),
        );

        match decision {
            SampleDecision::Accepted => {
                info!(
                    "significant motion detected: X={:.2} Y={:.2} Z={:.2}",
                    sample.x, sample.y, sample.z
                );
                self.dispatch().await;
                SAMPLE_INTERVAL
            }
            SampleDecision::Suppressed { remaining } => {
                debug!(
                    "candidate knock suppressed for another {:.2}s",
                    remaining.as_secs_f64()
                );
                SAMPLE_INTERVAL
            }
            SampleDecision::SubThreshold {
                diagnostic: Some(SubThresholdDiagnostic::NearThreshold),
            } => {
                info!(
                    "sub-threshold motion close to the knock threshold: {:.2} m/s^2",
                    sample.max_abs_axis()
                );
                DIAG_NEAR_PAUSE
            }
            SampleDecision::SubThreshold {
                diagnostic: Some(SubThresholdDiagnostic::Notable),
            } => {
                debug!("sub-threshold motion: {:.2} m/s^2", sample.max_abs_axis());
                DIAG_PAUSE
            }
            SampleDecision::SubThreshold { diagnostic: None } => SAMPLE_INTERVAL,
        }
    }

    /// Deliver one accepted detection. Failures are logged, never retried and
    /// never propagated — the gate has already advanced, so a delivery outage
    /// cannot cause a notification storm.
    async fn dispatch(&self) {
        if self.config.safe_mode {
            info!("[SAFE MODE] would send POST to {}", self.config.target_url);
            return;
        }

        match self.notifier.post(&self.config.target_url).await {
            Ok(response) if response.is_success() => {
                info!(
                    status = response.status,
                    "POST request sent to {}", self.config.target_url
                );
            }
            Ok(response) => {
                warn!(
                    status = response.status,
                    body = %response.body,
                    "notification rejected by {}",
                    self.config.target_url
                );
            }
            Err(err) => {
                warn!("error sending POST to {}: {err}", self.config.target_url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotifyError, SensorError};
    use crate::notifier::MockNotifier;
    use crate::source::MockAccelerometerSource;
    use crate::types::NotifyResponse;
    use detector_config::AccelRange;

    const THRESHOLD: f64 = 20.0;
    const DEBOUNCE: Duration = Duration::from_millis(1500);

    fn knock() -> AccelSample {
        AccelSample::new(25.0, 0.0, 0.0)
    }

    fn quiet() -> AccelSample {
        AccelSample::new(0.1, 0.2, 0.05)
    }

    fn decide_at(
        state: &mut DetectorState,
        sample: AccelSample,
        diagnostics: bool,
        now: Instant,
    ) -> SampleDecision {
        decide(state, &sample, THRESHOLD, DEBOUNCE, diagnostics, now)
    }

    fn test_config(safe_mode: bool) -> RuntimeConfig {
        RuntimeConfig {
            sensor_address: 0x68,
            knock_threshold: THRESHOLD,
            accel_range: AccelRange::Range2G,
            target_url: "http://sensor-hub.local:5000/knock".to_string(),
            debounce_seconds: 1.5,
            safe_mode,
            show_sub_threshold_motion: false,
        }
    }

    #[test]
    fn first_candidate_is_accepted_then_gated_then_accepted_again() {
        let mut state = DetectorState::new();
        let t0 = Instant::now();

        assert_eq!(decide_at(&mut state, knock(), false, t0), SampleDecision::Accepted);

        let at_half_second = decide_at(&mut state, knock(), false, t0 + Duration::from_millis(500));
        assert_eq!(
            at_half_second,
            SampleDecision::Suppressed {
                remaining: Duration::from_millis(1000),
            }
        );

        let at_two_seconds = decide_at(&mut state, knock(), false, t0 + Duration::from_secs(2));
        assert_eq!(at_two_seconds, SampleDecision::Accepted);
    }

    #[test]
    fn candidate_exactly_at_gate_reopen_is_accepted() {
        let mut state = DetectorState::new();
        let t0 = Instant::now();

        assert_eq!(decide_at(&mut state, knock(), false, t0), SampleDecision::Accepted);
        assert_eq!(
            decide_at(&mut state, knock(), false, t0 + DEBOUNCE),
            SampleDecision::Accepted
        );
    }

    #[test]
    fn suppressed_candidate_leaves_the_gate_unchanged() {
        let mut state = DetectorState::new();
        let t0 = Instant::now();

        decide_at(&mut state, knock(), false, t0);
        let gate = state.next_eligible_at;
        decide_at(&mut state, knock(), false, t0 + Duration::from_millis(100));
        assert_eq!(state.next_eligible_at, gate);
    }

    #[test]
    fn acceptance_advances_the_gate_to_arrival_plus_debounce() {
        let mut state = DetectorState::new();
        let t0 = Instant::now();

        decide_at(&mut state, knock(), false, t0);
        assert_eq!(state.next_eligible_at, Some(t0 + DEBOUNCE));

        let t1 = t0 + Duration::from_secs(5);
        decide_at(&mut state, knock(), false, t1);
        assert_eq!(state.next_eligible_at, Some(t1 + DEBOUNCE));
    }

    #[test]
    fn axis_equal_to_threshold_is_sub_threshold() {
        let mut state = DetectorState::new();
        let boundary = AccelSample::new(0.0, THRESHOLD, 0.0);
        assert_eq!(
            decide_at(&mut state, boundary, false, Instant::now()),
            SampleDecision::SubThreshold { diagnostic: None }
        );
    }

    #[test]
    fn any_single_axis_can_trigger_including_negative() {
        let t0 = Instant::now();
        for sample in [
            AccelSample::new(0.0, 25.0, 0.0),
            AccelSample::new(0.0, 0.0, -25.0),
        ] {
            let mut state = DetectorState::new();
            assert_eq!(decide_at(&mut state, sample, false, t0), SampleDecision::Accepted);
        }
    }

    #[test]
    fn replaying_a_sequence_yields_identical_decisions() {
        let t0 = Instant::now();
        let sequence = [
            (knock(), 0u64),
            (knock(), 300),
            (quiet(), 600),
            (AccelSample::new(15.0, 0.0, 0.0), 900),
            (knock(), 2500),
            (knock(), 2600),
        ];

        let run = || {
            let mut state = DetectorState::new();
            sequence
                .iter()
                .map(|(sample, offset_ms)| {
                    decide_at(
                        &mut state,
                        *sample,
                        true,
                        t0 + Duration::from_millis(*offset_ms),
                    )
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn diagnostics_stay_silent_when_disabled() {
        let mut state = DetectorState::new();
        let loud_but_sub = AccelSample::new(15.0, 0.0, 0.0);
        assert_eq!(
            decide_at(&mut state, loud_but_sub, false, Instant::now()),
            SampleDecision::SubThreshold { diagnostic: None }
        );
        assert_eq!(state.last_sub_threshold_max, 0.0);
    }

    #[test]
    fn diagnostics_require_minimum_magnitude() {
        let mut state = DetectorState::new();
        let faint = AccelSample::new(0.9, 0.0, 0.0);
        assert_eq!(
            decide_at(&mut state, faint, true, Instant::now()),
            SampleDecision::SubThreshold { diagnostic: None }
        );
    }

    #[test]
    fn diagnostic_fires_on_change_and_near_the_threshold() {
        let mut state = DetectorState::new();
        let now = Instant::now();

        // Fresh motion: change from 0 exceeds the delta.
        assert_eq!(
            decide_at(&mut state, AccelSample::new(5.0, 0.0, 0.0), true, now),
            SampleDecision::SubThreshold {
                diagnostic: Some(SubThresholdDiagnostic::Notable),
            }
        );
        assert_eq!(state.last_sub_threshold_max, 5.0);

        // Barely different and well below 70% of threshold: not worth a line,
        // and the recorded maximum is untouched.
        assert_eq!(
            decide_at(&mut state, AccelSample::new(5.3, 0.0, 0.0), true, now),
            SampleDecision::SubThreshold { diagnostic: None }
        );
        assert_eq!(state.last_sub_threshold_max, 5.0);

        // Above 70% of threshold: always reported.
        assert_eq!(
            decide_at(&mut state, AccelSample::new(15.0, 0.0, 0.0), true, now),
            SampleDecision::SubThreshold {
                diagnostic: Some(SubThresholdDiagnostic::Notable),
            }
        );

        // Above 80% of threshold: the near-threshold variant.
        assert_eq!(
            decide_at(&mut state, AccelSample::new(16.5, 0.0, 0.0), true, now),
            SampleDecision::SubThreshold {
                diagnostic: Some(SubThresholdDiagnostic::NearThreshold),
            }
        );
        assert_eq!(state.last_sub_threshold_max, 16.5);
    }

    #[tokio::test]
    async fn safe_mode_accepts_without_calling_the_notifier() {
        let mut source = MockAccelerometerSource::new();
        source.expect_read().times(1).returning(|| Ok(knock()));

        let mut notifier = MockNotifier::new();
        notifier.expect_post().times(0);

        let mut detector = KnockDetector::new(test_config(true), source, notifier);
        let pause = detector.step().await;

        assert_eq!(pause, SAMPLE_INTERVAL);
        assert!(detector.state.next_eligible_at.is_some());
    }

    #[tokio::test]
    async fn read_error_pauses_and_does_not_dispatch() {
        let mut source = MockAccelerometerSource::new();
        source
            .expect_read()
            .times(1)
            .returning(|| Err(SensorError::Read("i2c transaction failed".to_string())));

        let mut notifier = MockNotifier::new();
        notifier.expect_post().times(0);

        let mut detector = KnockDetector::new(test_config(false), source, notifier);
        let pause = detector.step().await;

        assert_eq!(pause, READ_RETRY_PAUSE);
        assert!(detector.state.next_eligible_at.is_none());
    }

    #[tokio::test]
    async fn rejected_dispatch_is_not_retried_and_still_advances_the_gate() {
        let mut source = MockAccelerometerSource::new();
        source.expect_read().times(2).returning(|| Ok(knock()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_post()
            .times(1)
            .withf(|url| url == "http://sensor-hub.local:5000/knock")
            .returning(|_| {
                Ok(NotifyResponse {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            });

        let mut detector = KnockDetector::new(test_config(false), source, notifier);
        detector.step().await;

        // The second candidate arrives well inside the debounce window and is
        // suppressed, so the notifier sees exactly one call.
        detector.step().await;
    }

    #[tokio::test]
    async fn transport_error_is_recovered_locally() {
        let mut source = MockAccelerometerSource::new();
        source.expect_read().times(1).returning(|| Ok(knock()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_post()
            .times(1)
            .returning(|_| Err(NotifyError::Transport("connection refused".to_string())));

        let mut detector = KnockDetector::new(test_config(false), source, notifier);
        let pause = detector.step().await;

        assert_eq!(pause, SAMPLE_INTERVAL);
        assert!(detector.state.next_eligible_at.is_some());
    }

    #[tokio::test]
    async fn diagnostic_pauses_follow_the_variant() {
        let mut source = MockAccelerometerSource::new();
        let mut readings = vec![
            AccelSample::new(16.5, 0.0, 0.0),
            AccelSample::new(5.0, 0.0, 0.0),
        ];
        source
            .expect_read()
            .times(2)
            .returning(move || Ok(readings.pop().unwrap()));

        let notifier = MockNotifier::new();

        let mut config = test_config(true);
        config.show_sub_threshold_motion = true;
        let mut detector = KnockDetector::new(config, source, notifier);

        assert_eq!(detector.step().await, DIAG_PAUSE);
        assert_eq!(detector.step().await, DIAG_NEAR_PAUSE);
    }
}
