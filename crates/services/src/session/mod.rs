mod controller;
mod state;

// Public API of the session subsystem.
pub use controller::{AttemptOutcome, SessionController, SubmitReport};
pub use state::SessionPhase;
