use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use quiz_core::collect::InputSignal;
use quiz_core::model::ScoreResult;

use crate::config::SequenceTimings;

/// Display surface the sequencer drives.
///
/// The core decides what to show and for how long; the presenter decides how
/// it is drawn. Positions are one-dimensional stage coordinates; `None` means
/// the corresponding widget was never wired up.
pub trait StagePresenter: Send + Sync {
    fn learner_position(&self) -> Option<f32>;
    fn target_position(&self) -> Option<f32>;
    /// Move the learner's on-screen representation to a stage coordinate.
    fn move_learner(&self, x: f32);
    /// Show text as learner-authored speech.
    fn show_learner_speech(&self, text: &str);
    /// Show text as the opposing party's speech.
    fn show_target_speech(&self, text: &str);
    fn clear_speech(&self);
    /// Show a short-lived input feedback message.
    fn show_notice(&self, signal: &InputSignal);
    /// Update the progress meter display with the milestone message.
    fn show_progress(&self, value: f32, message: &str);
}

/// How a feedback sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Completed,
    /// Learner or target reference absent; nothing ran, nothing changed.
    SkippedMissingWiring,
}

/// The ordered, time-gated feedback presentation.
///
/// Steps run strictly in order and always to completion; mutual exclusion
/// across the session is owned by the controller's phase, so the sequencer
/// itself needs no cancellation.
#[derive(Debug, Clone)]
pub struct FeedbackSequencer {
    timings: SequenceTimings,
}

impl FeedbackSequencer {
    #[must_use]
    pub fn new(timings: SequenceTimings) -> Self {
        Self { timings }
    }

    #[must_use]
    pub fn timings(&self) -> &SequenceTimings {
        &self.timings
    }

    /// Play the full sequence for one evaluated attempt.
    ///
    /// Order: approach the target, declare the submitted answers, think,
    /// resolve with the verdict, return to origin. The collector reset step
    /// is applied afterwards by the controller.
    pub async fn run(
        &self,
        presenter: &dyn StagePresenter,
        result: &ScoreResult,
    ) -> SequenceOutcome {
        let (Some(origin), Some(target)) =
            (presenter.learner_position(), presenter.target_position())
        else {
            warn!("feedback sequence skipped: stage wiring is missing");
            return SequenceOutcome::SkippedMissingWiring;
        };

        self.glide(presenter, origin, target).await;

        presenter.show_learner_speech(&result.evaluated_answers.join(", "));
        sleep(self.timings.declare_dwell).await;

        presenter.show_target_speech("...");
        sleep(self.timings.think_dwell).await;

        presenter.show_target_speech(&verdict_text(result));
        sleep(self.timings.resolve_dwell).await;

        self.glide(presenter, target, origin).await;
        presenter.clear_speech();

        SequenceOutcome::Completed
    }

    /// Interpolated movement; duration is distance over speed, not a flat
    /// wait. Collapses to a jump when speed or tick are zeroed (tests).
    async fn glide(&self, presenter: &dyn StagePresenter, from: f32, to: f32) {
        let distance = (to - from).abs();
        if distance <= f32::EPSILON || self.timings.approach_speed <= 0.0 {
            presenter.move_learner(to);
            return;
        }

        let total = Duration::from_secs_f32(distance / self.timings.approach_speed);
        let tick = self.timings.motion_tick;
        if tick.is_zero() || total <= tick {
            sleep(total).await;
            presenter.move_learner(to);
            return;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (total.as_secs_f32() / tick.as_secs_f32()).ceil().max(1.0) as u32;
        for step in 1..=steps {
            sleep(tick).await;
            #[allow(clippy::cast_precision_loss)]
            let t = step as f32 / steps as f32;
            presenter.move_learner(from + (to - from) * t);
        }
    }
}

fn verdict_text(result: &ScoreResult) -> String {
    if result.passed {
        format!("Correct! You scored {:.0}%.", result.score_percentage)
    } else {
        format!("Not quite. You scored {:.0}%.", result.score_percentage)
    }
}
