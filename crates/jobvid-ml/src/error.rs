//! Error types for the embedding and vector-search clients. Both are
//! transient-external failures surfaced as 5xx by the coordinator, never
//! a hard failure for vector search since the index lookup has a
//! fallback path.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("embedding response malformed: expected dimension {expected}, got {actual}")]
    EmbeddingMalformed { expected: usize, actual: usize },

    #[error("vector index unavailable: {0}")]
    VectorIndexUnavailable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MlError::EmbeddingUnavailable(_) | MlError::VectorIndexUnavailable(_) | MlError::Network(_)
        )
    }
}
