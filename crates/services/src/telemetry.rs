use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use quiz_core::model::SessionId;

use crate::error::TelemetryError;

/// What a telemetry event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    SubmissionEvaluated,
    ProgressUpdated,
    SessionCompleted,
}

/// One structured gameplay event.
///
/// Delivery is at-most-once: no acknowledgement, no retry.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryEvent {
    pub session: SessionId,
    pub kind: TelemetryKind,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

/// One-way sink for gameplay events.
#[async_trait]
pub trait TelemetryEmitter: Send + Sync {
    /// Deliver a single event.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError` when delivery fails; callers log and move on.
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetry;

#[async_trait]
impl TelemetryEmitter for NullTelemetry {
    async fn emit(&self, _event: TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct HttpTelemetryConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
}

impl HttpTelemetryConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("QUIZ_TELEMETRY_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        let auth_token = env::var("QUIZ_TELEMETRY_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self {
            endpoint,
            auth_token,
        })
    }
}

/// HTTP sink posting each event as JSON.
///
/// When unconfigured (no endpoint in the environment) events are silently
/// dropped; an unreachable or erroring endpoint surfaces as `TelemetryError`
/// for the caller to log.
#[derive(Clone)]
pub struct HttpTelemetry {
    client: Client,
    config: Option<HttpTelemetryConfig>,
}

impl HttpTelemetry {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(HttpTelemetryConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<HttpTelemetryConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl TelemetryEmitter for HttpTelemetry {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let Some(config) = self.config.as_ref() else {
            return Ok(());
        };

        let mut request = self.client.post(&config.endpoint).json(&event);
        if let Some(token) = &config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TelemetryError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
