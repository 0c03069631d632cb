//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reference date could not be parsed
    #[error("Invalid reference date {input:?}: {reason}")]
    InvalidDate {
        /// The rejected input
        input: String,
        /// Parser message
        reason: String,
    },

    /// Month arithmetic left the supported calendar range
    #[error("Period out of range: {0}")]
    PeriodOutOfRange(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error for {path}: {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    /// Wrap an IO error with the path that caused it.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
