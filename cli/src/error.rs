use pharmacy_core::{ApiError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid JSON argument: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
