//! Key-value persistence.
//!
//! The engine persists only small key-value state: daily counters under
//! `counts.<YYYY-MM-DD>` and study settings under `settings.*`, all as
//! JSON values in one flat namespace. The [`Store`] trait abstracts the
//! backing so any JSON-capable key-value medium (file, embedded db,
//! remote store) can satisfy it. [`SqliteStore`] is the default on-disk
//! backing; [`MemoryStore`] keeps tests and embedding callers isolated.

mod config;
mod memory;
mod sqlite;

pub use config::StudyConfig;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// A flat JSON key-value store.
pub trait Store {
    /// Fetch the value at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Set `key` to `value`, replacing any previous entry.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Fetch and decode the value at `key`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode and store `value` at `key`.
    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value)
    }
}

/// Returns `~/.config/mnemo[-dev]/` based on MNEMO_ENV.
///
/// Set MNEMO_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MNEMO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mnemo-dev")
    } else {
        base_dir.join("mnemo")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
