//! Error types for feature preparation and encoding.

use thiserror::Error;

/// Errors raised while preparing or encoding features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A required column is absent from the input table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A feature column has a type that cannot be encoded
    #[error("Column {column} has unsupported type {dtype}")]
    UnsupportedType {
        /// Column name
        column: String,
        /// Observed data type
        dtype: String,
    },

    /// A column expected to be complete contains nulls
    #[error("Column {0} contains null values")]
    NullValues(String),

    /// Encoder fit on zero rows
    #[error("Cannot fit on empty data")]
    EmptyFit,

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
