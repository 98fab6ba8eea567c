//! # Error Types
//!
//! This module defines error types used throughout the cardlabel library.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `Validation` | out-of-canvas coordinates, bad print parameters |
//! | `MissingVariable` | token templates with an absent or blank value |
//! | `Render` | drawing surface unavailable or mis-sized |
//! | `Transcode` | pixel surface to document bytes conversion |
//! | `Dispatch` | remote or local print service failures |
//!
//! Barcode symbol failures inside the raster renderer never show up here:
//! the renderer draws the raw data string instead.

use thiserror::Error;

/// Main error type for cardlabel operations
#[derive(Debug, Error)]
pub enum CardLabelError {
    /// Invalid layout, coordinates or parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// A template token had no value (or only whitespace)
    #[error("Missing value for template variable '{0}'")]
    MissingVariable(String),

    /// Drawing surface problems
    #[error("Render error: {0}")]
    Render(String),

    /// Encoding a rendered surface to document bytes failed
    #[error("Transcode error: {0}")]
    Transcode(String),

    /// Print service call failed
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Record lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CardLabelError {
    fn from(e: reqwest::Error) -> Self {
        CardLabelError::Dispatch(e.to_string())
    }
}
