//! The search endpoint: runs the coordinator and returns the response
//! shape clients poll against.

use axum::extract::State;
use axum::Json;
use jobvid_models::SearchResponse;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::services::coordinator::{SearchCoordinator, SearchInput};
use crate::state::AppState;

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<jobvid_models::SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let coordinator = SearchCoordinator {
        embedding: &state.embedding,
        vector_search: &state.vector_search,
        views: &state.views,
        videos: &state.videos,
        jobs: &state.jobs,
        queue: &state.queue,
        concurrency: &state.concurrency,
    };

    let outcome = coordinator
        .search(SearchInput {
            query: request.query,
            user_id: request.user_id.clone(),
        })
        .await?;

    let job_ids: Vec<String> = outcome.job_ids.iter().map(|id| id.to_string()).collect();

    Ok(Json(SearchResponse {
        user_id: request.user_id,
        count: job_ids.len(),
        job_ids,
        generation_triggered: outcome.generation_triggered,
        generation_job_ids: outcome.generation_job_ids,
    }))
}
