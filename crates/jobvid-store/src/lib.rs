//! Firestore-backed durable state: the view ledger (C3), the video catalog
//! (C4), and the generation queue (C5).
//!
//! Production-grade REST client with:
//! - Token caching via `gcp_auth`
//! - Exponential backoff with jitter (`retry`)
//! - Observability (tracing spans, metrics)
//!
//! ## Modules
//! - `client` - Firestore REST API client (get/create/update/delete/query/batchWrite)
//! - `retry` - Retry policy with exponential backoff
//! - `metrics` - Prometheus metrics collection
//! - `repos` - `ViewRepository`, `VideoRepository`, `GenerationQueueRepository`, `JobRepository`
//! - `types` - Firestore document types and value conversions

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod retry;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use repos::{
    GenerationQueueRepository, JobRepository, TransitionPatch, ViewRepository, VideoRepository,
};
pub use retry::RetryConfig;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};

