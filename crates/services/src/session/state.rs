use chrono::{DateTime, Utc};

use quiz_core::model::{ProgressMeter, SessionId};

/// The session controller's state machine.
///
/// `Idle -> Collecting -> Evaluating -> Sequencing -> {Collecting | Transitioning}`.
/// One phase enum owned by the controller replaces the per-mode busy booleans
/// the interaction variants would otherwise each carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Question assigned, collector not yet accepting input.
    Idle,
    /// The collector accepts learner input.
    Collecting,
    /// The scoring engine is running (synchronous, never fails).
    Evaluating,
    /// The feedback sequence is playing; new submissions are rejected.
    Sequencing,
    /// Progress reached completion; the controller is inert.
    Transitioning,
}

/// Mutable state for one active session, owned exclusively by the controller.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub progress: ProgressMeter,
    pub transitioned: bool,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: SessionId::new(),
            phase: SessionPhase::Idle,
            progress: ProgressMeter::new(),
            transitioned: false,
            started_at,
        }
    }
}
