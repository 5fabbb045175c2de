//! Core error types for nextup-core.
//!
//! This module defines the error hierarchy using thiserror. Data-quality
//! problems on individual candidates are not represented here: those are
//! recovered locally by the engine (the candidate is skipped and counted)
//! and never abort a ranking pass.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nextup-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration-related errors (fail fast at engine construction)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An explanation was requested for an id absent from the candidate set
    #[error("no candidate with id '{requested}' (available: {})", available.join(", "))]
    SubjectNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Caller-imposed time budget exceeded before a result was produced
    #[error("recommendation timed out after {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal failures (e.g. a worker thread died mid-computation)
    #[error("{0}")]
    Internal(String),
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

    /// Factor weights must sum to 1.0 within tolerance
    #[error("factor weights must sum to 1.0 +/- {tolerance}, got {sum:.3}")]
    InvalidWeightSum { sum: f64, tolerance: f64 },

    /// A single weight is outside [0.0, 1.0]
    #[error("weight '{name}' must be in [0.0, 1.0], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to resolve the data directory
    #[error("Failed to resolve data directory: {0}")]
    DataDirFailed(String),

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

    /// Schema initialization failed
    #[error("Schema initialization failed: {0}")]
    SchemaFailed(String),

    /// Record not found
    #[error("No record with id '{0}'")]
    NotFound(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
