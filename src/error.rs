use crate::clients::error::FetchError;
use crate::features::error::FeatureError;
use crate::io::error::DatasetIoError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    DatasetIo(#[from] DatasetIoError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to read pipeline config '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse pipeline config '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),
}
