use crate::features::error::FeatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode forecast response")]
    Decode(#[from] serde_json::Error),

    #[error("Hourly field '{field}' has {found} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Forecast response does not form a valid hourly frame")]
    Feature(#[from] FeatureError),
}
