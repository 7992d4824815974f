//! Core error types for focusday-core.
//!
//! Nothing in this crate is fatal to the host process: the worst outcomes
//! are loss of persistence (the session continues in memory) or rejection
//! of a single operation.

use thiserror::Error;

use crate::storage::StorageError;

/// Core error type for focusday-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An import payload was rejected; state is unchanged.
    #[error("Invalid import payload: {0}")]
    InvalidImport(String),

    /// A generic state patch was rejected; state is unchanged.
    #[error("Invalid state patch: {0}")]
    InvalidPatch(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A wall-clock time string could not be parsed
    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),

    /// A time block was given a zero-length window
    #[error("Invalid duration: must be greater than zero")]
    ZeroDuration,

    /// Priority slots are fixed at 1..=3
    #[error("Invalid priority slot {0}: slots are 1..=3")]
    InvalidPrioritySlot(u8),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
