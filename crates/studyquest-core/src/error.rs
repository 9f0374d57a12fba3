//! Core error types for studyquest-core.
//!
//! One `thiserror` hierarchy for the whole library. Most failure paths in the
//! reward core degrade to defaults instead of returning these; they surface at
//! the edges (store I/O, config files, the assistant and identity collaborators).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Text-completion errors
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// Identity provider errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Durable key-value store errors.
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

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// Store refused the write (test doubles, read-only media)
    #[error("Write rejected for key '{0}'")]
    WriteRejected(String),

    /// Value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {message}")]
    Encode { key: String, message: String },
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

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Text-completion errors. The display text ends up verbatim in the chat log.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Transport failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not a chat completion
    #[error("could not decode completion: {0}")]
    Decode(String),

    /// No API key configured
    #[error("no API key configured for the assistant")]
    MissingApiKey,

    /// Credential storage failure
    #[error("credential store error: {0}")]
    Credentials(String),
}

/// Identity provider errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login rejected or aborted
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Profile lookup failed after a successful login
    #[error("Failed to fetch profile: {0}")]
    ProfileFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Points can only be added
    #[error("Point amounts must be non-negative, got {amount}")]
    NegativeAmount { amount: i64 },

    /// Required text field was empty
    #[error("'{field}' must not be empty")]
    EmptyText { field: String },

    /// Game is not unlocked yet
    #[error("'{game}' is locked until level {level}")]
    Locked { game: String, level: u32 },

    /// Unknown catalog id
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<keyring::Error> for AssistantError {
    fn from(err: keyring::Error) -> Self {
        AssistantError::Credentials(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
