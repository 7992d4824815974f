//! Durable key-value storage.
//!
//! The core persists two independent entries: the serialized application
//! state under [`STATE_KEY`] and the analytics log under
//! [`ANALYTICS_KEY`]. Each is loaded, saved and pruned on its own.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use std::path::PathBuf;
use thiserror::Error;

/// Key under which the serialized application state is stored.
pub const STATE_KEY: &str = "state";

/// Key under which the serialized analytics log is stored.
pub const ANALYTICS_KEY: &str = "analytics";

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend is out of space
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// Read failed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Failed to open the backing store
    #[error("Failed to open storage at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },
}

/// Durable key-value storage consumed by the store and the analytics log.
///
/// Handles are cheap to clone; clones share the same underlying backend,
/// which keeps both entries in one place while the store and the log stay
/// independent components.
pub trait KvStore: Clone {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/focusday[-dev]/` based on FOCUSDAY_ENV.
///
/// Set FOCUSDAY_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSDAY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusday-dev")
    } else {
        base_dir.join("focusday")
    };

    std::fs::create_dir_all(&dir).map_err(|err| StorageError::OpenFailed {
        path: dir.clone(),
        message: err.to_string(),
    })?;
    Ok(dir)
}
