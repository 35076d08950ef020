//! Request/response shapes for the embedding provider and the vector
//! search index's outbound HTTP contracts.

use jobvid_models::JobId;
use serde::{Deserialize, Serialize};

/// Outbound embedding request: `{model, content, task_type, output_dim}`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub content: String,
    pub task_type: String,
    pub output_dim: usize,
}

impl EmbeddingRequest {
    pub fn retrieval_query(model: impl Into<String>, content: impl Into<String>, output_dim: usize) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            task_type: "retrieval_query".to_string(),
            output_dim,
        }
    }
}

/// A vector of `D` floats returned by the embedding provider.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub vector: Vec<f32>,
}

/// Conjunctive filter for a vector search: `active=true ∧ job_id ∉ excluded`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VectorSearchFilter {
    pub active: bool,
    pub excluded_job_ids: Vec<JobId>,
}

impl VectorSearchFilter {
    pub fn new(excluded_job_ids: Vec<JobId>) -> Self {
        Self {
            active: true,
            excluded_job_ids,
        }
    }
}

/// One top-K match: `(job_id, score, payload_subset)` with `score ∈ [0,1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorCandidate {
    pub job_id: JobId,
    pub score: f32,
    #[serde(default)]
    pub payload_subset: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorSearchRequest {
    pub vector: Vec<f32>,
    pub filter: VectorSearchFilter,
    pub limit: usize,
    pub num_candidates: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorSearchResponse {
    pub candidates: Vec<VectorCandidate>,
}

/// Health check response shared by both outbound services.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
