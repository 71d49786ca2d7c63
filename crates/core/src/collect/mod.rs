//! Answer collectors: one per interaction mode.
//!
//! A collector gathers one attempt's worth of raw answer strings and reports
//! them through [`CollectOutcome`]. Input problems are data, not errors: they
//! come back as an [`InputSignal`] for display and never abort the session.
//! All collector state is written only through the session controller's entry
//! points, which own the busy-flag mutual exclusion.

mod choice;
mod free_text;
mod placement;

use serde::Serialize;

pub use choice::{ChoiceOption, ChoiceSetCollector};
pub use free_text::FreeTextCollector;
pub use placement::{PlacementCollector, PlacementItem};

use crate::model::{Question, QuestionMode};

//
// ─── INPUT SIGNALS ────────────────────────────────────────────────────────────
//

/// How prominently an input message should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A short-lived feedback message for the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSignal {
    pub message: String,
    pub severity: Severity,
}

impl InputSignal {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

//
// ─── COLLECT OUTCOME ──────────────────────────────────────────────────────────
//

/// Result of one collector interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectOutcome {
    /// The input was recorded; the attempt continues.
    Accepted,
    /// The attempt is complete: these answers are ready for scoring.
    Ready(Vec<String>),
    /// The input was refused; show the signal, change nothing.
    Rejected(InputSignal),
    /// The input does not apply here (wrong variant, out of range, already
    /// placed). Silently a no-op.
    Ignored,
}

//
// ─── ANSWER COLLECTOR ─────────────────────────────────────────────────────────
//

/// The active collector for a session, one variant per [`QuestionMode`].
#[derive(Debug, Clone)]
pub enum AnswerCollector {
    ChoiceSet(ChoiceSetCollector),
    FreeText(FreeTextCollector),
    Placement(PlacementCollector),
}

impl AnswerCollector {
    /// Build the collector matching the question's mode.
    ///
    /// `labels` supplies the displayed options (ChoiceSet) or draggable item
    /// labels (Placement); it is unused for FreeText.
    #[must_use]
    pub fn for_question(question: &Question, labels: Vec<String>) -> Self {
        match question.mode() {
            QuestionMode::ChoiceSet => Self::ChoiceSet(ChoiceSetCollector::new(labels)),
            QuestionMode::FreeText => Self::FreeText(FreeTextCollector::for_question(question)),
            QuestionMode::Placement => Self::Placement(PlacementCollector::new(labels)),
        }
    }

    #[must_use]
    pub fn mode(&self) -> QuestionMode {
        match self {
            Self::ChoiceSet(_) => QuestionMode::ChoiceSet,
            Self::FreeText(_) => QuestionMode::FreeText,
            Self::Placement(_) => QuestionMode::Placement,
        }
    }

    /// Answers accumulated so far in the current attempt.
    #[must_use]
    pub fn submitted(&self) -> &[String] {
        match self {
            Self::ChoiceSet(_) | Self::Placement(_) => &[],
            Self::FreeText(collector) => collector.entries(),
        }
    }

    /// Clear all attempt state, keeping the configured options/items.
    pub fn reset(&mut self) {
        match self {
            Self::ChoiceSet(collector) => collector.reset(),
            Self::FreeText(collector) => collector.reset(),
            Self::Placement(collector) => collector.reset(),
        }
    }

    /// Toggle a choice option. No-op for other variants.
    pub fn toggle_choice(&mut self, index: usize) -> CollectOutcome {
        match self {
            Self::ChoiceSet(collector) => collector.toggle(index),
            _ => CollectOutcome::Ignored,
        }
    }

    /// Record a typed free-text entry. No-op for other variants.
    pub fn push_text(&mut self, entry: &str) -> CollectOutcome {
        match self {
            Self::FreeText(collector) => collector.push(entry),
            _ => CollectOutcome::Ignored,
        }
    }

    /// Place a labelled item into the target zone. No-op for other variants.
    pub fn place_item(&mut self, index: usize) -> CollectOutcome {
        match self {
            Self::Placement(collector) => collector.place(index),
            _ => CollectOutcome::Ignored,
        }
    }

    /// Explicit submit trigger.
    ///
    /// Placement submits on placement itself, so an explicit submit there is a
    /// no-op.
    pub fn submit(&mut self) -> CollectOutcome {
        match self {
            Self::ChoiceSet(collector) => collector.submit(),
            Self::FreeText(collector) => collector.finish(),
            Self::Placement(_) => CollectOutcome::Ignored,
        }
    }
}
