//! Error types for the core crate
//!
//! This module provides a consolidated error type for the core crate,
//! covering database access, test location and extraction failures.

use thiserror::Error;
use std::io;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// The file is not a readable SQLite database with a supported extension
    #[error("Invalid database file {path}: {reason}")]
    InvalidDatabaseFile {
        /// Path that was rejected
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Output file name does not end in `.pdf`
    #[error("Invalid output filename: {0}")]
    InvalidOutputFilename(String),

    /// No test type could be inferred or matched
    #[error("Unrecognized test type: {0}")]
    UnrecognizedTestType(String),

    /// The selection carries no usable test identifier
    #[error("Invalid test identifier: {0}")]
    InvalidTestIdentifier(String),

    /// An identifier cell could not be parsed as an integer
    #[error("Malformed identifier in column {column}: {value:?}")]
    MalformedIdentifier {
        /// Column the value came from
        column: String,
        /// The raw cell text
        value: String,
    },

    /// VICAT line outside 1..=5
    #[error("Invalid line number: {0} (expected 1..=5)")]
    InvalidLineNumber(i64),

    /// A table the report cannot do without is absent
    #[error("Missing required table: {0}")]
    MissingRequiredTable(String),

    /// VICAT selection without a line column
    #[error("Missing line selection: {0}")]
    MissingLineSelection(String),

    /// The required table exists but no row matched the test
    #[error("No matching rows: {0}")]
    NoMatchingRows(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert a database failure on `path` into an InvalidDatabaseFile
pub fn to_database_error<E: std::fmt::Display>(path: &str, err: E) -> CoreError {
    CoreError::InvalidDatabaseFile {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

/// Convert a string error to a ConfigError
pub fn to_config_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::ConfigError(err.to_string())
}
