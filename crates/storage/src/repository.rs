use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Well-known profile keys.
///
/// The store is a flat string-to-string map; absence of a key is not an error
/// and callers fall back to their documented defaults.
pub const KEY_LAST_SCORE: &str = "last_score";
pub const KEY_LAST_PLAYED_AT: &str = "last_played_at";

/// Repository contract for the small set of locally persisted profile values.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a raw value by key; `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Persist or overwrite a raw value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Last final score recorded for this profile (0-100).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a stored value does not parse.
    async fn last_score(&self) -> Result<Option<u8>, StorageError> {
        match self.get_value(KEY_LAST_SCORE).await? {
            Some(raw) => raw
                .parse::<u8>()
                .map(Some)
                .map_err(|err| StorageError::Serialization(format!("last_score: {err}"))),
            None => Ok(None),
        }
    }

    /// Record the final score of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_last_score(&self, score: u8) -> Result<(), StorageError> {
        self.set_value(KEY_LAST_SCORE, &score.to_string()).await
    }

    /// Timestamp of the most recent completed session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a stored value does not parse.
    async fn last_played_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        match self.get_value(KEY_LAST_PLAYED_AT).await? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|at| Some(at.with_timezone(&Utc)))
                .map_err(|err| StorageError::Serialization(format!("last_played_at: {err}"))),
            None => Ok(None),
        }
    }

    /// Record when a session was last completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_last_played_at(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.set_value(KEY_LAST_PLAYED_AT, &at.to_rfc3339()).await
    }
}

/// In-memory profile store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryProfile {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfile {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Connection("profile map lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Connection("profile map lock poisoned".into()))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let profile = InMemoryProfile::new();
        assert!(profile.last_score().await.unwrap().is_none());
        assert!(profile.last_played_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn typed_helpers_round_trip() {
        let profile = InMemoryProfile::new();
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        profile.set_last_score(85).await.unwrap();
        profile.set_last_played_at(at).await.unwrap();

        assert_eq!(profile.last_score().await.unwrap(), Some(85));
        assert_eq!(profile.last_played_at().await.unwrap(), Some(at));
    }

    #[tokio::test]
    async fn malformed_stored_score_is_a_serialization_error() {
        let profile = InMemoryProfile::new();
        profile.set_value(KEY_LAST_SCORE, "not a number").await.unwrap();
        let err = profile.last_score().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
