use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for the feedback sequence.
///
/// Dwell values are configuration, not fixed constants; a host application can
/// ship them as data. The approach and return steps derive their duration from
/// distance and `approach_speed` rather than a flat wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTimings {
    /// Stage units the learner's representation moves per second.
    pub approach_speed: f32,
    /// Interval between movement interpolation updates.
    pub motion_tick: Duration,
    /// Dwell while the submitted answers are shown as learner speech.
    pub declare_dwell: Duration,
    /// Dwell on the opposing party's "..." placeholder.
    pub think_dwell: Duration,
    /// Dwell on the correctness verdict.
    pub resolve_dwell: Duration,
    /// Delay before clearing collector state after an attempt, also used as
    /// the short pause before a free-text attempt auto-submits at capacity.
    pub reset_delay: Duration,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            approach_speed: 4.0,
            motion_tick: Duration::from_millis(40),
            declare_dwell: Duration::from_millis(1500),
            think_dwell: Duration::from_millis(1000),
            resolve_dwell: Duration::from_millis(1800),
            reset_delay: Duration::from_millis(600),
        }
    }
}

impl SequenceTimings {
    /// All-zero timings for tests: every dwell collapses and movement jumps.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            approach_speed: 0.0,
            motion_tick: Duration::ZERO,
            declare_dwell: Duration::ZERO,
            think_dwell: Duration::ZERO,
            resolve_dwell: Duration::ZERO,
            reset_delay: Duration::ZERO,
        }
    }
}

/// Session-level policy knobs.
///
/// Progress uses one flat-delta policy for every mode: a passing attempt adds
/// `pass_delta`, a failing one adds `fail_delta`; the score magnitude only
/// decides pass/fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub pass_delta: f32,
    pub fail_delta: f32,
    /// Clear the collector's accumulated answers after every attempt.
    pub clear_answers_after_attempt: bool,
    pub timings: SequenceTimings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pass_delta: 25.0,
            fail_delta: 10.0,
            clear_answers_after_attempt: true,
            timings: SequenceTimings::default(),
        }
    }
}

impl SessionConfig {
    /// Default policy with collapsed timings, for tests.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            timings: SequenceTimings::instant(),
            ..Self::default()
        }
    }
}
