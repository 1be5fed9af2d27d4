//! Error types for report assembly
//!
//! This module provides error types for laying out and writing reports.

use std::io;
use thiserror::Error;

use labreport_core::CoreError;

/// Result type for report assembly
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type for report assembly
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error from the extraction layer
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PDF serialization error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Chart rendering error
    #[error("Render error: {0}")]
    Render(String),

    /// Column ratios that cannot be turned into widths
    #[error("Invalid column ratios: {0}")]
    InvalidColumnRatios(String),

    /// Content that cannot be placed on a page
    #[error("Layout error: {0}")]
    Layout(String),
}

/// Convert a string error to a Render error
pub fn to_render_error<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}
