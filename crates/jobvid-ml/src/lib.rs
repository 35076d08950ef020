//! Clients for the two outbound ML collaborators: the embedding provider
//! and the vector search index. Both are accessed only through their HTTP
//! contract; this crate owns nothing about how either is implemented.

pub mod client;
pub mod error;
pub mod types;

pub use client::{EmbeddingClient, MlClientConfig, VectorSearchClient, FALLBACK_SCORE};
pub use error::{MlError, MlResult};
pub use types::{VectorCandidate, VectorSearchFilter};
