use serde::Serialize;

/// Progress-percentage tier with a fixed encouragement message.
///
/// Classification is most-specific first: 100 wins over 75, and so on down to
/// the starting tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Begin,
    Started,
    Halfway,
    NearComplete,
    Complete,
}

impl Milestone {
    /// Classify a progress value into its milestone tier.
    #[must_use]
    pub fn classify(progress: f32) -> Self {
        if progress >= 100.0 {
            Self::Complete
        } else if progress >= 75.0 {
            Self::NearComplete
        } else if progress >= 50.0 {
            Self::Halfway
        } else if progress >= 25.0 {
            Self::Started
        } else {
            Self::Begin
        }
    }

    /// The encouragement message shown for this tier.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Begin => "Let's get going!",
            Self::Started => "Nice start, keep it up!",
            Self::Halfway => "Halfway there!",
            Self::NearComplete => "Almost done, one more push!",
            Self::Complete => "Stage complete, well done!",
        }
    }
}

/// Bounded session progress counter.
///
/// The value is clamped to `[0, 100]` and never decreases within a session:
/// negative deltas are ignored rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressMeter {
    value: f32,
}

impl ProgressMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a meter from a persisted value, clamping into range.
    #[must_use]
    pub fn from_value(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 100.0),
        }
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.value >= 100.0
    }

    #[must_use]
    pub fn milestone(&self) -> Milestone {
        Milestone::classify(self.value)
    }

    /// Apply a progress delta, clamped to the upper bound, and return the
    /// milestone reached.
    pub fn add(&mut self, delta: f32) -> Milestone {
        if delta > 0.0 {
            self.value = (self.value + delta).clamp(0.0, 100.0);
        }
        self.milestone()
    }
}
