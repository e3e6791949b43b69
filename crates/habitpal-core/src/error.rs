//! Core error types for habitpal-core.
//!
//! This module defines the error hierarchy using thiserror. User-input
//! errors (`HabitError`) are recovered at the command boundary and turned
//! into a user-visible message; none of them is process-fatal. Delivery
//! failures never appear here -- they are logged inside the dispatcher and
//! never escape it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitpal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// User-input-shaped errors (bad zone, missing habit, duplicate, ...)
    #[error(transparent)]
    Habit(#[from] HabitError),

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors caused by user input to a habit operation.
///
/// Every variant maps to a message the command surface shows the user;
/// no variant mutates any persisted state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HabitError {
    /// The timezone identifier is not a recognized IANA name
    #[error("Unknown timezone '{0}' (expected an IANA name like America/Bogota)")]
    UnknownZone(String),

    /// The referenced habit does not exist for this user
    #[error("No habit named '{name}'")]
    HabitNotFound { name: String },

    /// A habit with the same case-folded name already exists for this user
    #[error("A habit named '{name}' already exists")]
    DuplicateHabit { name: String },

    /// Hour/minute outside 0-23 / 0-59
    #[error("Invalid schedule time {hour:02}:{minute:02} (hour must be 0-23, minute 0-59)")]
    InvalidSchedule { hour: u32, minute: u32 },
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or parse the persisted snapshot
    #[error("Failed to load store from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write the snapshot (the prior snapshot remains on disk)
    #[error("Failed to save store to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Data directory could not be determined or created
    #[error("Failed to prepare data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
