//! The search-and-generate coordinator (C6): orchestrates the embedding
//! client, vector search adapter, view ledger, video catalog, and
//! generation queue to answer one search request.

use jobvid_ml::{EmbeddingClient, VectorCandidate, VectorSearchClient, VectorSearchFilter, FALLBACK_SCORE};
use jobvid_models::config::{
    MAX_GENERATE_PER_REQUEST, MAX_USER_CONCURRENT, SIMILARITY_THRESHOLD, TARGET_COUNT,
    VECTOR_SEARCH_CANDIDATES, VECTOR_SEARCH_LIMIT, VIDEO_TEMPLATES,
};
use jobvid_models::{GenerationJob, JobId};
use jobvid_queue::JobQueue;
use jobvid_store::{FirestoreError, GenerationQueueRepository, JobRepository, ViewRepository, VideoRepository};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Everything about one user's search that the handler hands to the
/// coordinator.
pub struct SearchInput {
    pub query: String,
    pub user_id: String,
}

/// The coordinator's answer — mirrors the outbound search response shape
/// except for `user_id`, which the handler attaches.
pub struct SearchOutcome {
    pub job_ids: Vec<JobId>,
    pub generation_triggered: bool,
    pub generation_job_ids: Vec<String>,
}

/// Stateless orchestrator over C1-C5. Constructed per-request from `AppState`'s
/// shared handles — it owns no state of its own beyond the knobs it reads
/// from `jobvid_models::config`.
pub struct SearchCoordinator<'a> {
    pub embedding: &'a EmbeddingClient,
    pub vector_search: &'a VectorSearchClient,
    pub views: &'a ViewRepository,
    pub videos: &'a VideoRepository,
    pub jobs: &'a JobRepository,
    pub queue: &'a GenerationQueueRepository,
    pub concurrency: &'a JobQueue,
}

impl<'a> SearchCoordinator<'a> {
    pub async fn search(&self, input: SearchInput) -> ApiResult<SearchOutcome> {
        let fingerprint = jobvid_fingerprint::fingerprint(&input.query);
        let vector = self.embedding.embed(&input.query).await?;

        let seen = self.seen_job_ids(&input.user_id).await?;

        let mut candidates = self.top_k(vector.clone(), seen.clone()).await?;

        // Step 5: fallback-empty recovery.
        if candidates.is_empty() && !seen.is_empty() {
            info!(user_id = %input.user_id, "candidates empty with non-empty seen set, auto-resetting views");
            self.views.reset(&input.user_id).await?;
            candidates = self.top_k(vector, Vec::new()).await?;
        }

        let (a, b, c) = self.partition(&candidates).await?;

        // Step 7: available-empty recovery.
        if a.is_empty() && b.is_empty() && !seen.is_empty() {
            info!(user_id = %input.user_id, "no ready candidates, auto-resetting views and returning arbitrary ready videos");
            self.views.reset(&input.user_id).await?;
            let ready = self.videos.list_ready(TARGET_COUNT as u32).await?;
            let result: Vec<JobId> = ready.iter().map(|v| v.video_id).take(TARGET_COUNT).collect();
            for job_id in &result {
                self.views.mark_seen(&input.user_id, *job_id).await?;
            }
            return Ok(SearchOutcome {
                job_ids: result,
                generation_triggered: false,
                generation_job_ids: Vec::new(),
            });
        }

        // Step 8: normal path.
        let mut result: Vec<JobId> = a.iter().chain(b.iter()).map(|cand| cand.job_id).collect();
        result.truncate(TARGET_COUNT);

        let mut generation_job_ids = Vec::new();
        if a.len() < TARGET_COUNT {
            let deficit = TARGET_COUNT - a.len();
            let to_generate = &c[..c.len().min(deficit.min(MAX_GENERATE_PER_REQUEST))];

            for candidate in to_generate {
                if let Some(uuid) = self
                    .try_enqueue(candidate.job_id, &fingerprint, &input.user_id)
                    .await?
                {
                    generation_job_ids.push(uuid);
                }
            }
        }

        for job_id in &result {
            self.views.mark_seen(&input.user_id, *job_id).await?;
        }

        Ok(SearchOutcome {
            generation_triggered: !generation_job_ids.is_empty(),
            job_ids: result,
            generation_job_ids,
        })
    }

    async fn seen_job_ids(&self, user_id: &str) -> ApiResult<Vec<JobId>> {
        let page = self.views.list_seen(user_id, u32::MAX, 0).await?;
        Ok(page.job_ids)
    }

    /// Runs the vector search, degrading to C2's documented sentinel
    /// fallback (arbitrary active, unseen corpus records at `FALLBACK_SCORE`)
    /// when the index itself is unreachable — the coordinator is the one
    /// caller with catalog access to source that fallback from.
    async fn top_k(&self, vector: Vec<f32>, excluded: Vec<JobId>) -> ApiResult<Vec<VectorCandidate>> {
        let filter = VectorSearchFilter::new(excluded.clone());
        match self
            .vector_search
            .top_k(vector, filter, VECTOR_SEARCH_LIMIT, VECTOR_SEARCH_CANDIDATES)
            .await
        {
            Ok(candidates) => Ok(candidates),
            Err(jobvid_ml::MlError::VectorIndexUnavailable(reason)) => {
                warn!(%reason, "vector index unavailable, degrading to corpus fallback");
                let excluded_set: std::collections::HashSet<JobId> = excluded.into_iter().collect();
                let records = self.jobs.list_active(VECTOR_SEARCH_LIMIT as u32).await?;
                Ok(records
                    .into_iter()
                    .filter(|r| r.active && !excluded_set.contains(&r.job_id))
                    .take(VECTOR_SEARCH_LIMIT)
                    .map(|r| VectorCandidate {
                        job_id: r.job_id,
                        score: FALLBACK_SCORE,
                        payload_subset: r.payload,
                    })
                    .collect())
            }
            Err(e) => Err(ApiError::from(e)),
        }
    }

    /// Partitions candidates into A (ready, high score), B (ready, low
    /// score), C (not ready, high score).
    async fn partition(
        &self,
        candidates: &[VectorCandidate],
    ) -> ApiResult<(Vec<VectorCandidate>, Vec<VectorCandidate>, Vec<VectorCandidate>)> {
        let ids: Vec<JobId> = candidates.iter().map(|c| c.job_id).collect();
        let ready = self.videos.bulk_ready(&ids).await?;

        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut c = Vec::new();

        for candidate in candidates {
            let is_ready = ready.contains(&candidate.job_id);
            let high_score = candidate.score >= SIMILARITY_THRESHOLD;
            match (high_score, is_ready) {
                (true, true) => a.push(candidate.clone()),
                (false, true) => b.push(candidate.clone()),
                (true, false) => c.push(candidate.clone()),
                (false, false) => {}
            }
        }

        Ok((a, b, c))
    }

    /// Enqueues a generation job, swallowing `Duplicate`/`UserAtLimit` —
    /// contract errors never fail the request. Returns the uuid on success.
    async fn try_enqueue(&self, job_id: JobId, fingerprint: &str, user_id: &str) -> ApiResult<Option<String>> {
        if !self.concurrency.try_acquire(user_id, MAX_USER_CONCURRENT).await.unwrap_or(true) {
            debug!(%user_id, "concurrency guard rejected enqueue pre-check");
            return Ok(None);
        }

        let mut rng = rand::thread_rng();
        let template_id = VIDEO_TEMPLATES.choose(&mut rng).copied().unwrap_or("family_guy");
        let job = GenerationJob::new(job_id, template_id, fingerprint, user_id);
        let uuid = job.job_uuid.to_string();

        match self.queue.enqueue(&job).await {
            Ok(()) => Ok(Some(uuid)),
            Err(FirestoreError::Duplicate(reason)) => {
                debug!(%reason, "duplicate generation, swallowed");
                let _ = self.concurrency.release(user_id).await;
                Ok(None)
            }
            Err(FirestoreError::UserAtLimit(reason)) => {
                debug!(%reason, "user at concurrency limit, swallowed");
                let _ = self.concurrency.release(user_id).await;
                Ok(None)
            }
            Err(e) => {
                let _ = self.concurrency.release(user_id).await;
                Err(ApiError::from(e))
            }
        }
    }
}
