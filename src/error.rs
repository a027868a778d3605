//! Error types for opcert operations.
//!
//! This module defines [`OpcertError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration and input-file problems are errors and halt the run
//!   before any computation starts
//! - Data-quality anomalies inside the snapshots are never errors; they are
//!   reported as [`Finding`](crate::diagnostics::Finding)s
//! - Use `anyhow::Error` (via `OpcertError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for opcert operations.
#[derive(Debug, Error)]
pub enum OpcertError {
    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// An input snapshot file does not exist.
    #[error("Data source not found: {path}")]
    DataSourceNotFound { path: PathBuf },

    /// An input snapshot could not be read as JSON or as a pipe table.
    #[error("Failed to read data source {path}: {message}")]
    DataParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for opcert operations.
pub type Result<T> = std::result::Result<T, OpcertError>;
