//! Core error types for truedose-core.
//!
//! Gameplay never fails on an invalid transition (those are no-ops), so the
//! hierarchy here only covers content, storage, configuration and the
//! result handoff to profile sync.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for truedose-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The fact provider has nothing to show.
    #[error("No content available: the fact provider is empty")]
    NoContentAvailable,

    /// Content loading errors
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading fact records.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read facts from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse facts from {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bundled facts are malformed: {0}")]
    BundledMalformed(#[source] serde_json::Error),

    #[error("Duplicate fact id: {0}")]
    DuplicateId(String),
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

    /// Stored value could not be decoded
    #[error("Corrupt value for key '{key}': {message}")]
    CorruptValue { key: String, message: String },
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

    /// Could not resolve the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Errors from handing a session result to profile sync.
///
/// None of these are fatal to gameplay; they surface as soft failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The background worker is gone and can no longer accept results.
    #[error("Result channel closed")]
    ChannelClosed,

    /// The backing store rejected the write or read.
    #[error("Profile store failure: {0}")]
    Store(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseBusy
                    || err.code == rusqlite::ErrorCode::DatabaseLocked
                {
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

impl From<DatabaseError> for SyncError {
    fn from(err: DatabaseError) -> Self {
        SyncError::Store(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
