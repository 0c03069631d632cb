//! Model errors.

use ridetime_features::FeatureError;
use thiserror::Error;

/// Errors that can occur while fitting or applying the model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Feature preparation or encoding failed
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Nothing to fit or score
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// NaN or infinite input
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}
