#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod scene;
pub mod sequence;
pub mod session;
pub mod telemetry;

pub use quiz_core::Clock;

pub use config::{SequenceTimings, SessionConfig};
pub use error::TelemetryError;
pub use scene::{NoTransition, SceneTransition};
pub use sequence::{FeedbackSequencer, SequenceOutcome, StagePresenter};
pub use session::{AttemptOutcome, SessionController, SessionPhase, SubmitReport};
pub use telemetry::{
    HttpTelemetry, NullTelemetry, TelemetryEmitter, TelemetryEvent, TelemetryKind,
};
