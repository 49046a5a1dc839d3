//! Error types for the BPMAI converter.
//!
//! Most failures in a batch run are logged and skipped per file; these types
//! carry enough context for the log line and for the few errors that do abort
//! a run (destination creation, top-level enumeration, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum BpmaiError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    // Transformation engine errors
    #[error("Transformation failed: {message}")]
    TransformFailed { message: String },

    #[error("Transformation produced empty output")]
    EmptyOutput,

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, BpmaiError>;

impl From<std::io::Error> for BpmaiError {
    fn from(err: std::io::Error) -> Self {
        BpmaiError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BpmaiError {
    fn from(err: serde_json::Error) -> Self {
        BpmaiError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<csv::Error> for BpmaiError {
    fn from(err: csv::Error) -> Self {
        BpmaiError::Csv {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl BpmaiError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => BpmaiError::FileNotFound(path),
            _ => BpmaiError::Io {
                message: err.to_string(),
                path: Some(path),
                source: Some(err),
            },
        }
    }

    /// Whether the error means the path simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            BpmaiError::FileNotFound(_) => true,
            BpmaiError::Io {
                source: Some(source),
                ..
            } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BpmaiError::TransformFailed {
            message: "unknown stencil".into(),
        };
        assert_eq!(err.to_string(), "Transformation failed: unknown stencil");
        assert_eq!(
            BpmaiError::EmptyOutput.to_string(),
            "Transformation produced empty output"
        );
    }

    #[test]
    fn test_io_with_path_maps_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let mapped = BpmaiError::io_with_path(err, "/models/a.svg");
        assert!(matches!(mapped, BpmaiError::FileNotFound(ref p) if p.ends_with("a.svg")));
        assert!(mapped.is_not_found());

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let mapped = BpmaiError::io_with_path(err, "/models/a.svg");
        assert!(!mapped.is_not_found());
    }
}
