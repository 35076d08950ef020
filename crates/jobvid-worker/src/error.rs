//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Missing or too-short job description. Handled specially by the
    /// processor — an immediate `running→failed`, never retried.
    #[error("job description invalid: {0}")]
    InvalidDescription(String),

    #[error("renderer request failed: {0}")]
    RenderFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] jobvid_storage::StorageError),

    #[error("store error: {0}")]
    Store(#[from] jobvid_store::FirestoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
