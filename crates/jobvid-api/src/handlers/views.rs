//! View ledger endpoints: mark_seen, check, bulk_check, list_seen, reset.

use axum::extract::{Path, Query, State};
use axum::Json;
use jobvid_models::JobId;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SeenResponse {
    pub seen: bool,
}

pub async fn mark_seen_view(
    State(state): State<AppState>,
    Path((user_id, job_id)): Path<(String, i64)>,
) -> ApiResult<Json<SeenResponse>> {
    state.views.mark_seen(&user_id, JobId::new(job_id)).await?;
    Ok(Json(SeenResponse { seen: true }))
}

pub async fn check_view(
    State(state): State<AppState>,
    Path((user_id, job_id)): Path<(String, i64)>,
) -> ApiResult<Json<SeenResponse>> {
    let seen = state.views.check(&user_id, JobId::new(job_id)).await?;
    Ok(Json(SeenResponse { seen }))
}

#[derive(Deserialize)]
pub struct BulkCheckRequest {
    pub job_ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct BulkCheckResponse {
    pub seen: std::collections::HashMap<String, bool>,
}

pub async fn bulk_check_views(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<BulkCheckRequest>,
) -> ApiResult<Json<BulkCheckResponse>> {
    let job_ids: Vec<JobId> = request.job_ids.into_iter().map(JobId::new).collect();
    let result = state.views.bulk_check(&user_id, &job_ids).await?;
    let seen = result.into_iter().map(|(id, seen)| (id.to_string(), seen)).collect();
    Ok(Json(BulkCheckResponse { seen }))
}

#[derive(Deserialize)]
pub struct ListSeenParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
}

fn default_limit() -> u32 {
    50
}

#[derive(Serialize)]
pub struct ListSeenResponse {
    pub job_ids: Vec<String>,
    pub total: u64,
}

pub async fn list_seen_views(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListSeenParams>,
) -> ApiResult<Json<ListSeenResponse>> {
    let page = state.views.list_seen(&user_id, params.limit, params.skip).await?;
    Ok(Json(ListSeenResponse {
        job_ids: page.job_ids.iter().map(|id| id.to_string()).collect(),
        total: page.total,
    }))
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub deleted: u64,
}

pub async fn reset_views(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ResetResponse>> {
    let deleted = state.views.reset(&user_id).await?;
    Ok(Json(ResetResponse { deleted }))
}
