//! Inbound/outbound shapes for the search operation.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 2048))]
    pub query: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub user_id: String,
    pub job_ids: Vec<String>,
    pub count: usize,
    pub generation_triggered: bool,
    pub generation_job_ids: Vec<String>,
}
