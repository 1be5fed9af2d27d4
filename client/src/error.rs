//! Error types for the client crate
//!
//! This module provides the error type for credential storage, remote
//! retrieval and summary export.

use std::io;
use thiserror::Error;

use labreport_core::CoreError;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// QR code encoding error
    #[error("QR code error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Remote transfer error
    #[error("Remote error: {0}")]
    Remote(String),

    /// Credential that cannot be stored
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// A required field is empty
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Error from the core crate
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Convert a transfer failure to a Remote error
pub fn to_remote_error<E: std::fmt::Display>(err: E) -> ClientError {
    ClientError::Remote(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = to_remote_error("connection refused");
        assert_eq!(err.to_string(), "Remote error: connection refused");

        let err: ClientError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ClientError::Io(_)));

        let err = ClientError::MissingField("raw material".to_string());
        assert_eq!(err.to_string(), "Missing field: raw material");
    }
}
