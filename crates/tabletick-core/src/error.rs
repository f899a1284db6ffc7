//! Core error types for tabletick-core.
//!
//! This module defines the error hierarchy using thiserror. Only storage,
//! configuration, validation and remote-write failures ever propagate; cue
//! failures and unreadable persisted data are absorbed where they happen.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tabletick-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ranking backend errors
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Player count outside the supported table sizes
    #[error("Player count must be between 2 and 4, got {0}")]
    PlayerCount(usize),

    /// Not enough player names configured for the requested table size
    #[error("Roster has {available} names but {requested} players were requested")]
    RosterTooShort { requested: usize, available: usize },

    /// Zero-length turn
    #[error("Seconds per turn must be greater than zero")]
    ZeroTurnLength,

    /// Tap duration outside the supported set
    #[error("Unsupported tap duration {0}s (expected one of 3, 5, 10, 30, 60)")]
    TapDuration(u32),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Operation not allowed in the current phase
    #[error("{0}")]
    InvalidState(String),
}

/// Ranking backend errors.
#[derive(Error, Debug)]
pub enum RankingError {
    /// The remote endpoint answered with a non-success status
    #[error("Ranking server rejected the score (HTTP {status})")]
    Rejected { status: u16 },

    /// The remote endpoint answered 2xx but reported failure in the body
    #[error("Ranking server reported the score was not saved")]
    NotAccepted,

    /// Network or protocol failure talking to the endpoint
    #[error("Ranking server unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend cannot perform this operation
    #[error("Operation not supported by the {backend} ranking backend: {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// Local persistence failed
    #[error("Local ranking storage failed: {0}")]
    Storage(#[from] DatabaseError),

    /// Async runtime for the remote client could not be built
    #[error("Failed to start ranking client runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Signal output errors. Never propagated past [`crate::signals::Signals`].
#[derive(Error, Debug)]
pub enum SignalError {
    /// The output device does not offer this capability
    #[error("{0} output is not supported")]
    Unsupported(&'static str),

    /// Writing to the output device failed
    #[error("Signal output failed: {0}")]
    Io(#[from] std::io::Error),

    /// No usable audio device, or the playback thread is gone
    #[error("Audio device unavailable: {0}")]
    Device(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
