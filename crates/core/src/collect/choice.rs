use super::{CollectOutcome, InputSignal};

/// One discrete toggleable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    label: String,
    selected: bool,
}

impl ChoiceOption {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Collector for the choice-set mode.
///
/// The learner toggles any number of discrete options; submit copies every
/// option currently marked selected. Each option is a single control, so
/// duplicates cannot exist by construction.
#[derive(Debug, Clone)]
pub struct ChoiceSetCollector {
    options: Vec<ChoiceOption>,
}

impl ChoiceSetCollector {
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            options: labels
                .into_iter()
                .map(|label| ChoiceOption {
                    label,
                    selected: false,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Flip the selection state of one option.
    pub fn toggle(&mut self, index: usize) -> CollectOutcome {
        match self.options.get_mut(index) {
            Some(option) => {
                option.selected = !option.selected;
                CollectOutcome::Accepted
            }
            None => CollectOutcome::Ignored,
        }
    }

    /// Submit the current selection.
    ///
    /// Rejected with a warning when nothing is selected; no state changes.
    pub fn submit(&mut self) -> CollectOutcome {
        let selected: Vec<String> = self
            .options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.label.clone())
            .collect();

        if selected.is_empty() {
            return CollectOutcome::Rejected(InputSignal::warning("Select at least one answer"));
        }
        CollectOutcome::Ready(selected)
    }

    pub fn reset(&mut self) {
        for option in &mut self.options {
            option.selected = false;
        }
    }
}
