#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryProfile, ProfileRepository, StorageError};
pub use sqlite::{SqliteInitError, SqliteProfile};
