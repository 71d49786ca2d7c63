//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by telemetry sinks.
///
/// Telemetry is best-effort: these errors are logged by the session controller
/// and never surfaced to the learner or allowed to block a state transition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("telemetry endpoint returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
