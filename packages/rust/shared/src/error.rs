//! Error types for docshift.
//!
//! Library crates use [`DocshiftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docshift operations.
#[derive(Debug, thiserror::Error)]
pub enum DocshiftError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed structure description. Names the offending key or value.
    #[error("invalid structure: {message}")]
    Structure { message: String },

    /// A planned source path did not exist when it was copied.
    #[error("copy source does not exist: {}", path.display())]
    Copy { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad output layout, serialization failure, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The external site generator failed.
    #[error("toolchain error: {0}")]
    Toolchain(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocshiftError>;

impl DocshiftError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a structure error from any displayable message.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Report a copy source that vanished.
    pub fn copy(path: impl Into<PathBuf>) -> Self {
        Self::Copy { path: path.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocshiftError::config("sidebar must be auto, custom or js");
        assert_eq!(
            err.to_string(),
            "config error: sidebar must be auto, custom or js"
        );

        let err = DocshiftError::structure("Key: Lessons, Value: 42");
        assert!(err.to_string().contains("Key: Lessons"));

        let err = DocshiftError::copy("/src/missing.md");
        assert_eq!(err.to_string(), "copy source does not exist: /src/missing.md");
    }
}
