use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid locale code: {0}")]
    InvalidLocale(String),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
