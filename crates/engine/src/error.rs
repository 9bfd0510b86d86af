use thiserror::Error;

use opencatalog_storage::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] opencatalog_core::CoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("job rejected: {0}")]
    Rejected(String),
}
