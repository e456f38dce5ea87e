use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Required column '{0}' not found in frame")]
    InvalidColumn(String),

    #[error("Column '{0}' already exists; feature columns are never overwritten")]
    DuplicateColumn(String),

    #[error("Column '{column}' has non-numeric dtype {dtype}")]
    NonNumericColumn { column: String, dtype: String },

    #[error("Invalid date index: {0}")]
    InvalidDateIndex(String),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
