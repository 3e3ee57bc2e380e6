//! Core error types for kindled-core.
//!
//! This module defines the error hierarchy using thiserror. The split
//! follows how failures are actually handled: validation errors surface
//! to the caller synchronously, store errors degrade to cached data, and
//! cache errors are swallowed after logging.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kindled-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid caller-supplied configuration or arguments
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session store collaborator failures
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors. Raised synchronously, before any computation runs.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Shorthand for the common "must be positive" rejection.
    pub fn non_positive(field: &str) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        }
    }
}

/// Session store collaborator errors.
///
/// These never propagate past the engine boundary; the engine logs them
/// and falls back to cached or zero-value results.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The fetch collaborator failed
    #[error("Session store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
            source: None,
        }
    }
}

/// Cache read/write errors. Always swallowed: a failing cache degrades
/// to recomputation from the session store, never to a caller-visible error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store rejected the operation
    #[error("Cache backend failure: {0}")]
    Backend(String),

    /// Stored entry could not be decoded
    #[error("Cache entry decode failure: {0}")]
    Decode(#[from] serde_json::Error),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
