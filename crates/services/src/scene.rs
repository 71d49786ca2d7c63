/// Boundary to the host application's scene/screen navigation.
///
/// Invoked exactly once per session, when progress reaches the completion
/// threshold; the controller guards against double invocation.
pub trait SceneTransition: Send + Sync {
    /// Begin the transition out of the stage, carrying the final score
    /// (0-100): the score percentage of the attempt that completed the
    /// session.
    fn begin(&self, final_score: u8);
}

/// Scene boundary that goes nowhere, for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransition;

impl SceneTransition for NoTransition {
    fn begin(&self, _final_score: u8) {}
}
