//! Core error types for flightfocus-core.
//!
//! This module defines the error hierarchy using thiserror. Lifecycle and
//! validation failures are reported without touching any state; persistence
//! failures are reported after the in-memory state has been updated.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionPhase;

/// Core error type for flightfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The session descriptor failed validation.
    #[error("Invalid session: {reason}")]
    InvalidSession { reason: String },

    /// A lifecycle command was issued from a phase that does not allow it.
    #[error("Cannot {action} while session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: SessionPhase,
    },

    /// A lifecycle command was issued before any session was created.
    #[error("No active session")]
    NoSession,

    /// Business class was requested without any credits left.
    #[error("No business flights available (have {available})")]
    InsufficientCredits { available: u32 },

    /// Store read/write failures
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The storage backend rejected the read or write.
    #[error("Storage backend failed: {0}")]
    Backend(String),

    /// A stored value could not be parsed.
    #[error("Corrupt value for '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// A value could not be serialized for storage.
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                PersistenceError::Backend("database is locked".to_string())
            }
            _ => PersistenceError::Backend(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
