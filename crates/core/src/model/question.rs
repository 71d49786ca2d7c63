use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised while validating a question definition.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("prompt text is empty")]
    EmptyPrompt,

    #[error("canonical answer set is empty")]
    NoCanonicalAnswers,

    #[error("min answers required ({min}) exceeds max answers allowed ({max})")]
    AnswerBoundsInverted { min: u32, max: u32 },

    #[error("max answers allowed must be at least 1")]
    ZeroMaxAnswers,

    #[error("passing score percentage {0} is outside 0..=100")]
    ThresholdOutOfRange(f32),
}

//
// ─── QUESTION MODE ────────────────────────────────────────────────────────────
//

/// How the learner's answer is collected for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionMode {
    /// Toggle any number of discrete options, then submit the selection.
    ChoiceSet,
    /// Type answers one at a time, accumulating up to a maximum.
    FreeText,
    /// Drop exactly one labelled item into the target zone.
    Placement,
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Canonical definition of a prompt and its correctness rules.
///
/// Supplied once by the question source when a session starts and immutable for
/// the session's duration. The canonical answer set is normalized at
/// construction time so membership checks stay cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    mode: QuestionMode,
    canonical_answers: BTreeSet<String>,
    min_answers_required: u32,
    max_answers_allowed: u32,
    allow_duplicate_answers: bool,
    case_sensitive: bool,
    passing_score_percentage: f32,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is empty, the canonical set is
    /// empty, the answer bounds are inverted or zero, or the passing threshold
    /// falls outside `0..=100`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: impl Into<String>,
        mode: QuestionMode,
        canonical_answers: impl IntoIterator<Item = String>,
        min_answers_required: u32,
        max_answers_allowed: u32,
        allow_duplicate_answers: bool,
        case_sensitive: bool,
        passing_score_percentage: f32,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if max_answers_allowed == 0 {
            return Err(QuestionError::ZeroMaxAnswers);
        }
        if min_answers_required > max_answers_allowed {
            return Err(QuestionError::AnswerBoundsInverted {
                min: min_answers_required,
                max: max_answers_allowed,
            });
        }
        if !(0.0..=100.0).contains(&passing_score_percentage) {
            return Err(QuestionError::ThresholdOutOfRange(passing_score_percentage));
        }

        let canonical_answers: BTreeSet<String> = canonical_answers
            .into_iter()
            .map(|answer| normalize(&answer, case_sensitive))
            .filter(|answer| !answer.is_empty())
            .collect();
        if canonical_answers.is_empty() {
            return Err(QuestionError::NoCanonicalAnswers);
        }

        Ok(Self {
            text,
            mode,
            canonical_answers,
            min_answers_required,
            max_answers_allowed,
            allow_duplicate_answers,
            case_sensitive,
            passing_score_percentage,
        })
    }

    /// A choice-set question: one submission of any number of toggled options.
    ///
    /// # Errors
    ///
    /// See [`Question::new`].
    pub fn choice_set(
        text: impl Into<String>,
        canonical_answers: impl IntoIterator<Item = String>,
        passing_score_percentage: f32,
    ) -> Result<Self, QuestionError> {
        Self::new(
            text,
            QuestionMode::ChoiceSet,
            canonical_answers,
            1,
            1,
            false,
            false,
            passing_score_percentage,
        )
    }

    /// A free-text question accumulating between `min` and `max` typed answers.
    ///
    /// # Errors
    ///
    /// See [`Question::new`].
    pub fn free_text(
        text: impl Into<String>,
        canonical_answers: impl IntoIterator<Item = String>,
        min_answers_required: u32,
        max_answers_allowed: u32,
        allow_duplicate_answers: bool,
        passing_score_percentage: f32,
    ) -> Result<Self, QuestionError> {
        Self::new(
            text,
            QuestionMode::FreeText,
            canonical_answers,
            min_answers_required,
            max_answers_allowed,
            allow_duplicate_answers,
            false,
            passing_score_percentage,
        )
    }

    /// A placement question: a single labelled item dropped into one zone.
    ///
    /// # Errors
    ///
    /// See [`Question::new`].
    pub fn placement(
        text: impl Into<String>,
        canonical_answers: impl IntoIterator<Item = String>,
    ) -> Result<Self, QuestionError> {
        Self::new(
            text,
            QuestionMode::Placement,
            canonical_answers,
            1,
            1,
            false,
            false,
            100.0,
        )
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn mode(&self) -> QuestionMode {
        self.mode
    }

    #[must_use]
    pub fn canonical_answers(&self) -> &BTreeSet<String> {
        &self.canonical_answers
    }

    #[must_use]
    pub fn min_answers_required(&self) -> u32 {
        self.min_answers_required
    }

    #[must_use]
    pub fn max_answers_allowed(&self) -> u32 {
        self.max_answers_allowed
    }

    #[must_use]
    pub fn allow_duplicate_answers(&self) -> bool {
        self.allow_duplicate_answers
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    #[must_use]
    pub fn passing_score_percentage(&self) -> f32 {
        self.passing_score_percentage
    }

    /// Normalize a raw answer according to this question's comparison rules.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        normalize(raw, self.case_sensitive)
    }

    /// Whether a raw answer matches the canonical answer set.
    #[must_use]
    pub fn is_canonical(&self, raw: &str) -> bool {
        self.canonical_answers.contains(&self.normalize(raw))
    }
}

/// Trim surrounding whitespace; lower-case unless the comparison is
/// case-sensitive.
#[must_use]
pub(crate) fn normalize(raw: &str, case_sensitive: bool) -> String {
    let trimmed = raw.trim();
    if case_sensitive {
        trimmed.to_owned()
    } else {
        trimmed.to_lowercase()
    }
}
