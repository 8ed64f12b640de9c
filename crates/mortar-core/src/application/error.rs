//! Application layer errors.
//!
//! These errors represent failures around processing (loading, scanner
//! setup), not problems in template content. Content problems are
//! `RenderError`s from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating a render.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The scanner could not adopt the current delimiters.
    #[error("Marker scanner rejected configuration: {reason}")]
    ScannerConfiguration { reason: String },

    /// No template exists at the requested location.
    #[error("Template not found: {location}")]
    TemplateNotFound { location: String },

    /// A template exists but could not be read.
    #[error("Failed to load template {location}: {reason}")]
    LoadFailed { location: String, reason: String },

    /// Rendered output could not be written.
    #[error("Failed to write {location}: {reason}")]
    WriteFailed { location: String, reason: String },

    /// URL scheme the loader can't handle.
    #[error("Unsupported URL scheme in {url}")]
    UnsupportedScheme { url: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ScannerConfiguration { reason } => vec![
                format!("Scanner error: {}", reason),
                "Check the [delimiters] section of your configuration".into(),
            ],
            Self::TemplateNotFound { location } => vec![
                format!("Nothing found at: {}", location),
                "Check the path and the loader's root directory".into(),
            ],
            Self::LoadFailed { location, .. } => vec![
                format!("Failed to read: {}", location),
                "Check that you have read permissions".into(),
                "Templates must be UTF-8 text".into(),
            ],
            Self::WriteFailed { location, .. } => vec![
                format!("Failed to write: {}", location),
                "Check that the destination directory is writable".into(),
            ],
            Self::UnsupportedScheme { url } => vec![
                format!("Cannot load {}", url),
                "Only file:// URLs are supported".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ScannerConfiguration { .. } => ErrorCategory::Configuration,
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::LoadFailed { .. } | Self::WriteFailed { .. } => ErrorCategory::Internal,
            Self::UnsupportedScheme { .. } => ErrorCategory::Validation,
        }
    }
}
