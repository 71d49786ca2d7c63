use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use quiz_core::Clock;
use quiz_core::collect::{AnswerCollector, CollectOutcome, InputSignal};
use quiz_core::model::{Milestone, Question, ScoreResult, SessionId, evaluate};
use storage::repository::ProfileRepository;

use super::state::{SessionPhase, SessionState};
use crate::config::SessionConfig;
use crate::scene::SceneTransition;
use crate::sequence::{FeedbackSequencer, SequenceOutcome, StagePresenter};
use crate::telemetry::{TelemetryEmitter, TelemetryEvent, TelemetryKind};

//
// ─── REPORTS ──────────────────────────────────────────────────────────────────
//

/// What one accepted, evaluated attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub score: ScoreResult,
    pub progress: f32,
    pub milestone: Milestone,
    pub completed: bool,
}

/// Result of forwarding one learner interaction to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReport {
    /// Input recorded; the attempt continues.
    Pending,
    /// Input refused with a display signal; no answer or progress mutation.
    Rejected(InputSignal),
    /// Input did not apply (wrong mode, out of range, missing wiring).
    Ignored,
    /// A full attempt was scored and the feedback sequence has completed.
    Evaluated(AttemptOutcome),
}

//
// ─── CONTROLLER ───────────────────────────────────────────────────────────────
//

/// Owns the active question and collector, wires collector output into the
/// scoring engine and progress meter, and drives the feedback sequence.
///
/// All collector writes flow through this type's entry points; the phase enum
/// provides the session-wide mutual exclusion, so a submission arriving while
/// the sequence plays is rejected, never queued.
pub struct SessionController {
    question: Question,
    collector: AnswerCollector,
    config: SessionConfig,
    clock: Clock,
    sequencer: FeedbackSequencer,
    presenter: Arc<dyn StagePresenter>,
    telemetry: Arc<dyn TelemetryEmitter>,
    scene: Arc<dyn SceneTransition>,
    profile: Arc<dyn ProfileRepository>,
    state: SessionState,
    previous_score: Option<u8>,
    previously_played_at: Option<DateTime<Utc>>,
}

impl SessionController {
    /// Start a session for one question.
    ///
    /// `labels` supplies the displayed options (choice set) or item labels
    /// (placement); it is unused for free text. The previous final score and
    /// last-played timestamp are read from the profile best-effort: a storage
    /// failure is logged and the session starts without them.
    #[allow(clippy::too_many_arguments)]
    pub async fn start(
        question: Question,
        labels: Vec<String>,
        config: SessionConfig,
        clock: Clock,
        presenter: Arc<dyn StagePresenter>,
        telemetry: Arc<dyn TelemetryEmitter>,
        scene: Arc<dyn SceneTransition>,
        profile: Arc<dyn ProfileRepository>,
    ) -> Self {
        let collector = AnswerCollector::for_question(&question, labels);
        let mut state = SessionState::new(clock.now());

        let previous_score = match profile.last_score().await {
            Ok(score) => score,
            Err(err) => {
                warn!(error = %err, "could not read previous score");
                None
            }
        };
        let previously_played_at = match profile.last_played_at().await {
            Ok(at) => at,
            Err(err) => {
                warn!(error = %err, "could not read last played timestamp");
                None
            }
        };

        state.phase = SessionPhase::Collecting;
        debug!(session = %state.session_id, mode = ?question.mode(), "session started");

        Self {
            question,
            collector,
            sequencer: FeedbackSequencer::new(config.timings.clone()),
            config,
            clock,
            presenter,
            telemetry,
            scene,
            profile,
            state,
            previous_score,
            previously_played_at,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.state.session_id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.state.progress.value()
    }

    #[must_use]
    pub fn milestone(&self) -> Milestone {
        self.state.progress.milestone()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.state.started_at
    }

    /// Final score of the previous session, when one was on record.
    #[must_use]
    pub fn previous_score(&self) -> Option<u8> {
        self.previous_score
    }

    /// When the previous session was completed, when one was on record.
    #[must_use]
    pub fn previously_played_at(&self) -> Option<DateTime<Utc>> {
        self.previously_played_at
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn collector(&self) -> &AnswerCollector {
        &self.collector
    }

    /// Toggle a choice-set option.
    pub fn toggle_choice(&mut self, index: usize) -> SubmitReport {
        if let Some(signal) = self.busy_signal() {
            return self.reject(signal);
        }
        match self.collector.toggle_choice(index) {
            CollectOutcome::Accepted => SubmitReport::Pending,
            CollectOutcome::Rejected(signal) => self.reject(signal),
            CollectOutcome::Ready(_) | CollectOutcome::Ignored => SubmitReport::Ignored,
        }
    }

    /// Record one typed free-text entry.
    ///
    /// Filling the attempt to capacity auto-submits after a short pause, with
    /// no further learner action.
    pub async fn enter_text(&mut self, entry: &str) -> SubmitReport {
        if let Some(signal) = self.busy_signal() {
            return self.reject(signal);
        }
        match self.collector.push_text(entry) {
            CollectOutcome::Accepted => SubmitReport::Pending,
            CollectOutcome::Rejected(signal) => self.reject(signal),
            CollectOutcome::Ready(answers) => {
                sleep(self.config.timings.reset_delay).await;
                self.run_attempt(answers).await
            }
            CollectOutcome::Ignored => SubmitReport::Ignored,
        }
    }

    /// Place a labelled item into the target zone.
    ///
    /// A successful placement is itself the submission.
    pub async fn place_item(&mut self, index: usize) -> SubmitReport {
        if let Some(signal) = self.busy_signal() {
            return self.reject(signal);
        }
        match self.collector.place_item(index) {
            CollectOutcome::Ready(answers) => self.run_attempt(answers).await,
            CollectOutcome::Rejected(signal) => self.reject(signal),
            CollectOutcome::Accepted | CollectOutcome::Ignored => SubmitReport::Ignored,
        }
    }

    /// Explicit submit trigger for the current attempt.
    pub async fn submit(&mut self) -> SubmitReport {
        if let Some(signal) = self.busy_signal() {
            return self.reject(signal);
        }
        match self.collector.submit() {
            CollectOutcome::Ready(answers) => self.run_attempt(answers).await,
            CollectOutcome::Rejected(signal) => self.reject(signal),
            CollectOutcome::Accepted | CollectOutcome::Ignored => SubmitReport::Ignored,
        }
    }

    /// Score a completed attempt, play the feedback sequence, and apply
    /// progress.
    async fn run_attempt(&mut self, answers: Vec<String>) -> SubmitReport {
        self.state.phase = SessionPhase::Evaluating;
        let result = match evaluate(&self.question, &answers) {
            Ok(result) => result,
            Err(err) => {
                // Collectors reject empty submissions before this point.
                error!(error = %err, "scoring refused the submission");
                self.state.phase = SessionPhase::Collecting;
                return self.reject(InputSignal::error("That answer could not be scored"));
            }
        };
        debug!(
            score = result.score_percentage,
            passed = result.passed,
            "attempt evaluated"
        );

        self.state.phase = SessionPhase::Sequencing;
        let sequence = self.sequencer.run(self.presenter.as_ref(), &result).await;
        if sequence == SequenceOutcome::SkippedMissingWiring {
            // No progress, no reset; the session stays collectable.
            self.state.phase = SessionPhase::Collecting;
            return SubmitReport::Ignored;
        }

        let delta = if result.passed {
            self.config.pass_delta
        } else {
            self.config.fail_delta
        };
        let milestone = self.state.progress.add(delta);
        let progress = self.state.progress.value();
        self.presenter.show_progress(progress, milestone.message());

        self.emit(
            TelemetryKind::SubmissionEvaluated,
            json!({
                "answers": result.evaluated_answers,
                "score": result.score_percentage,
                "passed": result.passed,
            }),
        );
        self.emit(
            TelemetryKind::ProgressUpdated,
            json!({ "progress": progress, "milestone": milestone }),
        );

        let completed = self.state.progress.is_complete();
        if completed {
            self.finish_session(&result).await;
        } else {
            if self.config.clear_answers_after_attempt {
                sleep(self.config.timings.reset_delay).await;
                self.collector.reset();
            }
            self.state.phase = SessionPhase::Collecting;
        }

        SubmitReport::Evaluated(AttemptOutcome {
            score: result,
            progress,
            milestone,
            completed,
        })
    }

    /// End-of-session branch: scene transition once, completion telemetry,
    /// best-effort profile writes.
    ///
    /// Progress is always at its cap here, so the final score handed to the
    /// transition is the closing attempt's score percentage.
    async fn finish_session(&mut self, result: &ScoreResult) {
        self.state.phase = SessionPhase::Transitioning;
        if self.state.transitioned {
            return;
        }
        self.state.transitioned = true;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_score = result.score_percentage.round().clamp(0.0, 100.0) as u8;
        self.scene.begin(final_score);
        self.emit(
            TelemetryKind::SessionCompleted,
            json!({ "final_score": final_score }),
        );

        if let Err(err) = self.profile.set_last_score(final_score).await {
            warn!(error = %err, "could not persist final score");
        }
        if let Err(err) = self.profile.set_last_played_at(self.clock.now()).await {
            warn!(error = %err, "could not persist last played timestamp");
        }
        debug!(session = %self.state.session_id, final_score, "session complete");
    }

    /// Backpressure: `Some` while the session cannot accept input.
    fn busy_signal(&self) -> Option<InputSignal> {
        match self.state.phase {
            SessionPhase::Evaluating | SessionPhase::Sequencing => Some(InputSignal::info(
                "Hang on, your last answer is still being checked",
            )),
            SessionPhase::Transitioning => {
                Some(InputSignal::info("This stage is already complete"))
            }
            SessionPhase::Idle | SessionPhase::Collecting => None,
        }
    }

    fn reject(&self, signal: InputSignal) -> SubmitReport {
        self.presenter.show_notice(&signal);
        SubmitReport::Rejected(signal)
    }

    /// Fire-and-forget event emission. The spawned task is never awaited and
    /// may outlive the session; failures are logged only.
    fn emit(&self, kind: TelemetryKind, payload: serde_json::Value) {
        let event = TelemetryEvent {
            session: self.state.session_id,
            kind,
            payload,
            at: self.clock.now(),
        };
        let emitter = Arc::clone(&self.telemetry);
        tokio::spawn(async move {
            if let Err(err) = emitter.emit(event).await {
                warn!(error = %err, "telemetry emission failed");
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn set_phase_for_test(&mut self, phase: SessionPhase) {
        self.state.phase = phase;
    }
}
