use thiserror::Error;

use opencatalog_core::boundary::WriteError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested transition is not legal in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// A required field is empty; the save is blocked client-side.
    #[error("required field is empty: {0}")]
    MissingField(String),

    /// The boundary rejected the submission for a non-conflict reason.
    #[error("save rejected: {0}")]
    Rejected(#[from] WriteError),
}
