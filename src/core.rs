use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error types for the mediabar application.
///
/// Covers configuration loading and validation. Bus and service failures
/// live in [`MediaError`](crate::services::mpris::MediaError).
#[derive(Error, Debug)]
pub enum MediabarError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },
}

/// A specialized `Result` type for mediabar operations.
pub type Result<T> = std::result::Result<T, MediabarError>;

impl MediabarError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        MediabarError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error with file path context.
    pub fn io(error: impl std::fmt::Display, path: &Path) -> Self {
        MediabarError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Creates a validation error for one configuration section.
    pub fn validation(component: &str, details: impl Into<String>) -> Self {
        MediabarError::ConfigValidation {
            component: component.to_string(),
            details: details.into(),
        }
    }
}
