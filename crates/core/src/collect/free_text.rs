use super::{CollectOutcome, InputSignal};
use crate::model::{Question, normalize};

/// Collector for the free-text mode.
///
/// The learner types and submits individual entries, accumulating up to the
/// question's `max_answers_allowed`. Per-entry validation runs in order:
/// empty, capacity, duplicate. Reaching capacity completes the attempt without
/// a further explicit action (the controller owns the short auto-submit
/// delay).
#[derive(Debug, Clone)]
pub struct FreeTextCollector {
    entries: Vec<String>,
    min_answers_required: u32,
    max_answers_allowed: u32,
    allow_duplicates: bool,
    case_sensitive: bool,
}

impl FreeTextCollector {
    #[must_use]
    pub fn for_question(question: &Question) -> Self {
        Self {
            entries: Vec::new(),
            min_answers_required: question.min_answers_required(),
            max_answers_allowed: question.max_answers_allowed(),
            allow_duplicates: question.allow_duplicate_answers(),
            case_sensitive: question.case_sensitive(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_answers_allowed as usize
    }

    /// Record one typed entry.
    ///
    /// Returns `Ready` with the full answer set when this entry fills the
    /// attempt to capacity.
    pub fn push(&mut self, entry: &str) -> CollectOutcome {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return CollectOutcome::Rejected(InputSignal::warning("Type an answer first"));
        }
        if self.is_full() {
            return CollectOutcome::Rejected(InputSignal::warning(format!(
                "No more than {} answers allowed",
                self.max_answers_allowed
            )));
        }
        if !self.allow_duplicates && self.contains(trimmed) {
            return CollectOutcome::Rejected(InputSignal::warning(
                "You already gave that answer",
            ));
        }

        self.entries.push(trimmed.to_owned());
        if self.is_full() {
            CollectOutcome::Ready(self.entries.clone())
        } else {
            CollectOutcome::Accepted
        }
    }

    /// Explicitly finish the attempt with the entries gathered so far.
    ///
    /// Rejected when fewer than `min_answers_required` entries exist.
    pub fn finish(&mut self) -> CollectOutcome {
        if (self.entries.len() as u32) < self.min_answers_required {
            return CollectOutcome::Rejected(InputSignal::warning(format!(
                "Give at least {} answers first",
                self.min_answers_required
            )));
        }
        CollectOutcome::Ready(self.entries.clone())
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn contains(&self, candidate: &str) -> bool {
        let needle = normalize(candidate, self.case_sensitive);
        self.entries
            .iter()
            .any(|existing| normalize(existing, self.case_sensitive) == needle)
    }
}
