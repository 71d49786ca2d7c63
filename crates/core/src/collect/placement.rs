use super::CollectOutcome;

/// One draggable labelled item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementItem {
    label: String,
    placed: bool,
}

impl PlacementItem {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.placed
    }
}

/// Collector for the placement mode.
///
/// Exactly one labelled item goes into the single target zone; its label
/// becomes the one submitted answer. Re-assignment while an item is already
/// placed is a no-op guarded by the per-item `placed` flag.
#[derive(Debug, Clone)]
pub struct PlacementCollector {
    items: Vec<PlacementItem>,
}

impl PlacementCollector {
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            items: labels
                .into_iter()
                .map(|label| PlacementItem {
                    label,
                    placed: false,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[PlacementItem] {
        &self.items
    }

    /// Assign the item at `index` into the target zone.
    ///
    /// Yields `Ready` with the item's label the first time; anything after a
    /// successful placement (or out of range) is ignored.
    pub fn place(&mut self, index: usize) -> CollectOutcome {
        if self.items.iter().any(|item| item.placed) {
            return CollectOutcome::Ignored;
        }
        match self.items.get_mut(index) {
            Some(item) => {
                item.placed = true;
                CollectOutcome::Ready(vec![item.label.clone()])
            }
            None => CollectOutcome::Ignored,
        }
    }

    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.placed = false;
        }
    }
}
