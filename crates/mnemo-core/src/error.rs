//! Core error types for mnemo-core.
//!
//! Session-start failures (`StartError`) are expected, recoverable
//! conditions: the caller stays in the setup state and may retry with a
//! different scope or mode. Everything else is store or configuration
//! trouble surfaced through thiserror hierarchies.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mnemo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session-start failures
    #[error("Session error: {0}")]
    Session(#[from] StartError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The data directory could not be resolved or created
    #[error("Failed to prepare data directory: {source}")]
    DataDir {
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded as JSON
    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be decoded
    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Reasons a session can fail to start.
///
/// `QuotaExhausted` and `EmptyQueue` carry distinct caller messaging:
/// "come back tomorrow" versus "nothing to study here".
#[derive(Error, Debug)]
pub enum StartError {
    /// No review slots left today
    #[error("Daily review quota exhausted")]
    QuotaExhausted,

    /// No due or matching cards
    #[error("No cards match the requested scope")]
    EmptyQueue,

    /// Reading the daily counters failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
