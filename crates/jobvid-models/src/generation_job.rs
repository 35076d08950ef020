//! The generation job record (C5) — the durable unit of work a worker claims,
//! renders, and resolves to a `Video`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GenerationJobId, JobId};

/// Lifecycle status of a generation job. See invariants 3-5: `running`
/// requires `worker_id`+`started_at`, `ready` is terminal and implies the
/// `Video` row exists, `retry_count` is only ever meaningful once `failed`.
///
/// `Uploaded` and `Indexed` are non-terminal bookkeeping statuses exposed
/// purely for observability — nothing ever branches on them; `claim`/dedup
/// logic only ever inspects `Queued`/`Running`/`Ready`/`Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Queued,
    Running,
    Uploaded,
    Indexed,
    Ready,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Queued => "queued",
            GenerationStatus::Running => "running",
            GenerationStatus::Uploaded => "uploaded",
            GenerationStatus::Indexed => "indexed",
            GenerationStatus::Ready => "ready",
            GenerationStatus::Failed => "failed",
        }
    }

    /// `ready` and `failed` are terminal — the two outcomes the coordinator
    /// and sweeper actually branch on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Ready | GenerationStatus::Failed)
    }

    /// `queued` or `running` — counted against a user's concurrency limit
    /// (invariant 3).
    pub fn counts_toward_concurrency(&self) -> bool {
        matches!(self, GenerationStatus::Queued | GenerationStatus::Running)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generation job: a request to render a video for `job_id`, keyed by its
/// own UUID (`job_uuid`) and deduplicated against other live jobs by
/// `(query_fingerprint, job_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub job_uuid: GenerationJobId,
    pub job_id: JobId,
    pub template_id: String,
    pub query_fingerprint: String,
    pub user_id: String,
    pub status: GenerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Always equal to `job_id` once set (invariant: `output_video_id = job_id`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_video_id: Option<JobId>,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationJob {
    /// Create a new queued job for a normalized query against `job_id`.
    pub fn new(
        job_id: JobId,
        template_id: impl Into<String>,
        query_fingerprint: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_uuid: GenerationJobId::new(),
            job_id,
            template_id: template_id.into(),
            query_fingerprint: query_fingerprint.into(),
            user_id: user_id.into(),
            status: GenerationStatus::Queued,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            output_video_id: None,
            retry_count: 0,
            worker_id: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_queued_with_no_lease() {
        let job = GenerationJob::new(JobId::new(7), "family_guy", "abc123", "user-1");
        assert_eq!(job.status, GenerationStatus::Queued);
        assert!(!job.is_terminal());
        assert!(job.worker_id.is_none());
        assert!(job.started_at.is_none());
    }

    #[test]
    fn ready_and_failed_are_terminal_uploaded_and_indexed_are_not() {
        assert!(GenerationStatus::Ready.is_terminal());
        assert!(GenerationStatus::Failed.is_terminal());
        assert!(!GenerationStatus::Uploaded.is_terminal());
        assert!(!GenerationStatus::Indexed.is_terminal());
        assert!(!GenerationStatus::Queued.is_terminal());
        assert!(!GenerationStatus::Running.is_terminal());
    }

    #[test]
    fn queued_and_running_count_toward_concurrency() {
        assert!(GenerationStatus::Queued.counts_toward_concurrency());
        assert!(GenerationStatus::Running.counts_toward_concurrency());
        assert!(!GenerationStatus::Ready.counts_toward_concurrency());
        assert!(!GenerationStatus::Failed.counts_toward_concurrency());
    }
}
