//! Typed repositories for the view ledger (C3), the video catalog (C4), and
//! the generation queue (C5).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use jobvid_models::config::MAX_USER_CONCURRENT;
use jobvid_models::{
    GenerationJob, GenerationJobId, GenerationStatus, JobId, JobRecord, SeenPage, Video, VideoId,
    VideoStatus, View,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FieldFilterOp, FromFirestoreValue, Precondition, ToFirestoreValue, Value, Write};

/// Cap on scan-style queries (bulk_check, list_seen, reset) — generous
/// relative to any single user's realistic view set.
const SCAN_LIMIT: u32 = 2000;

/// Attempts `claim` makes against progressively-stale CAS races before
/// giving up and reporting no job available.
const MAX_CLAIM_ATTEMPTS: u32 = 5;

fn view_doc_id(user_id: &str, job_id: JobId) -> String {
    format!("{}_{}", user_id, job_id.get())
}

fn lock_doc_id(fingerprint: &str, job_id: JobId) -> String {
    format!("{}_{}", fingerprint, job_id.get())
}

// ============================================================================
// View Ledger (C3)
// ============================================================================

/// Repository for `(user_id, job_id) -> seen` facts. Doc id is the
/// deterministic composite `{user_id}_{job_id}`, which is itself the unique
/// constraint invariant 92 of the data model requires.
pub struct ViewRepository {
    client: FirestoreClient,
    collection: &'static str,
}

impl ViewRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            client,
            collection: "views",
        }
    }

    /// Upsert `seen=true`. Idempotent: a duplicate concurrent call either
    /// lands the PATCH or races into `AlreadyExists` on the fallback create,
    /// either of which leaves the same row in place.
    pub async fn mark_seen(&self, user_id: &str, job_id: JobId) -> FirestoreResult<()> {
        let doc_id = view_doc_id(user_id, job_id);
        let fields = view_to_fields(&View::seen_now(user_id, job_id));

        match self
            .client
            .update_document(self.collection, &doc_id, fields.clone(), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(FirestoreError::NotFound(_)) => {
                match self.client.create_document(self.collection, &doc_id, fields).await {
                    Ok(_) => Ok(()),
                    Err(FirestoreError::AlreadyExists(_)) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    pub async fn check(&self, user_id: &str, job_id: JobId) -> FirestoreResult<bool> {
        let doc_id = view_doc_id(user_id, job_id);
        let doc = self.client.get_document(self.collection, &doc_id).await?;
        Ok(doc
            .and_then(|d| d.fields)
            .and_then(|f| f.get("seen").and_then(bool::from_firestore_value))
            .unwrap_or(false))
    }

    /// Single scan over the user's views rather than one round-trip per job.
    pub async fn bulk_check(
        &self,
        user_id: &str,
        job_ids: &[JobId],
    ) -> FirestoreResult<HashMap<JobId, bool>> {
        let seen = self.seen_job_ids(user_id).await?;
        Ok(job_ids.iter().map(|id| (*id, seen.contains(id))).collect())
    }

    pub async fn list_seen(&self, user_id: &str, limit: u32, skip: u32) -> FirestoreResult<SeenPage> {
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![
                    ("user_id".to_string(), FieldFilterOp::Equal, user_id.to_firestore_value()),
                    ("seen".to_string(), FieldFilterOp::Equal, true.to_firestore_value()),
                ],
                Some(("updated_at".to_string(), true)),
                SCAN_LIMIT,
            )
            .await?;

        let job_ids: Vec<JobId> = docs.iter().filter_map(doc_job_id).collect();
        let total = job_ids.len() as u64;
        let page = job_ids.into_iter().skip(skip as usize).take(limit as usize).collect();

        Ok(SeenPage { job_ids: page, total })
    }

    /// Delete every view for the user in a single atomic batch write.
    pub async fn reset(&self, user_id: &str) -> FirestoreResult<u64> {
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![("user_id".to_string(), FieldFilterOp::Equal, user_id.to_firestore_value())],
                None,
                SCAN_LIMIT,
            )
            .await?;

        let writes: Vec<Write> = docs
            .into_iter()
            .filter_map(|d| d.name)
            .map(|name| Write {
                update: None,
                delete: Some(name),
                update_mask: None,
                current_document: None,
            })
            .collect();

        if writes.is_empty() {
            return Ok(0);
        }

        let count = writes.len() as u64;
        self.client.batch_write(writes).await?;
        info!(user_id, count, "reset views");
        Ok(count)
    }

    async fn seen_job_ids(&self, user_id: &str) -> FirestoreResult<HashSet<JobId>> {
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![("user_id".to_string(), FieldFilterOp::Equal, user_id.to_firestore_value())],
                None,
                SCAN_LIMIT,
            )
            .await?;

        Ok(docs
            .iter()
            .filter(|d| {
                d.fields
                    .as_ref()
                    .and_then(|f| f.get("seen"))
                    .and_then(bool::from_firestore_value)
                    .unwrap_or(false)
            })
            .filter_map(doc_job_id)
            .collect())
    }
}

fn view_to_fields(view: &View) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("user_id".to_string(), view.user_id.to_firestore_value());
    fields.insert("job_id".to_string(), view.job_id.get().to_firestore_value());
    fields.insert("seen".to_string(), view.seen.to_firestore_value());
    fields.insert("updated_at".to_string(), view.updated_at.to_firestore_value());
    fields
}

fn doc_job_id(doc: &Document) -> Option<JobId> {
    doc.fields
        .as_ref()?
        .get("job_id")
        .and_then(i64::from_firestore_value)
        .map(JobId::new)
}

// ============================================================================
// Video Catalog (C4)
// ============================================================================

/// Repository for the terminal, once-written `Video` catalog rows. Doc id is
/// the `video_id` itself — the primary uniqueness mechanism for invariant 1.
pub struct VideoRepository {
    client: FirestoreClient,
    collection: &'static str,
}

impl VideoRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            client,
            collection: "videos",
        }
    }

    pub async fn get(&self, video_id: VideoId) -> FirestoreResult<Option<Video>> {
        let doc = self
            .client
            .get_document(self.collection, &video_id.get().to_string())
            .await?;
        doc.map(|d| document_to_video(&d)).transpose()
    }

    /// Insert the terminal row. Idempotent under worker retry: if the row
    /// already exists (a crash between upload and insert, then a re-claim),
    /// treat it as success rather than surfacing `AlreadyExists`.
    pub async fn create(&self, video: &Video) -> FirestoreResult<()> {
        let fields = video_to_fields(video);
        match self
            .client
            .create_document(self.collection, &video.video_id.get().to_string(), fields)
            .await
        {
            Ok(_) => Ok(()),
            Err(FirestoreError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Which of the given ids already have a `ready` video row. Used by the
    /// coordinator's partition step (A/B/C against candidates). One
    /// structured query with an `IN` filter rather than a get-per-candidate
    /// loop, since this runs on the request path against a tight deadline.
    pub async fn bulk_ready(&self, video_ids: &[VideoId]) -> FirestoreResult<HashSet<VideoId>> {
        if video_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = video_ids.iter().map(|id| id.get()).collect();
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![(
                    "video_id".to_string(),
                    FieldFilterOp::In,
                    ids.to_firestore_value(),
                )],
                None,
                ids.len() as u32,
            )
            .await?;

        docs.iter()
            .map(document_to_video)
            .filter_map(|result| match result {
                Ok(video) if video.status == VideoStatus::Ready => Some(Ok(video.video_id)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }

    /// Arbitrary `ready` videos, for the available-empty recovery path.
    pub async fn list_ready(&self, limit: u32) -> FirestoreResult<Vec<Video>> {
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![(
                    "status".to_string(),
                    FieldFilterOp::Equal,
                    VideoStatus::Ready.as_str().to_firestore_value(),
                )],
                None,
                limit,
            )
            .await?;
        docs.iter().map(document_to_video).collect()
    }
}

fn video_to_fields(video: &Video) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("video_id".to_string(), video.video_id.get().to_firestore_value());
    fields.insert("status".to_string(), video.status.as_str().to_firestore_value());
    fields.insert(
        "storage_manifest_key".to_string(),
        video.storage_manifest_key.to_firestore_value(),
    );
    fields.insert("template_id".to_string(), video.template_id.to_firestore_value());
    fields.insert("created_at".to_string(), video.created_at.to_firestore_value());
    fields.insert(
        "generation_job_id".to_string(),
        video.generation_job_id.as_str().to_firestore_value(),
    );
    fields
}

fn document_to_video(doc: &Document) -> FirestoreResult<Video> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::InvalidResponse("video document has no fields".to_string()))?;

    let video_id = fields
        .get("video_id")
        .and_then(i64::from_firestore_value)
        .map(JobId::new)
        .ok_or_else(|| FirestoreError::InvalidResponse("video document missing video_id".to_string()))?;

    let status = match fields.get("status").and_then(String::from_firestore_value).as_deref() {
        Some("ready") => VideoStatus::Ready,
        _ => VideoStatus::Pending,
    };

    Ok(Video {
        video_id,
        status,
        storage_manifest_key: fields
            .get("storage_manifest_key")
            .and_then(String::from_firestore_value)
            .unwrap_or_default(),
        template_id: fields
            .get("template_id")
            .and_then(String::from_firestore_value)
            .unwrap_or_default(),
        created_at: fields
            .get("created_at")
            .and_then(DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
        generation_job_id: fields
            .get("generation_job_id")
            .and_then(String::from_firestore_value)
            .map(GenerationJobId::from_string)
            .unwrap_or_default(),
    })
}

// ============================================================================
// Job Corpus (read-only, external)
// ============================================================================

/// Read-only access to the externally-authored job corpus. The core never
/// writes this collection; it only reads individual records (worker render
/// step) and scans for arbitrary active ones (coordinator's empty-candidate
/// recovery path).
pub struct JobRepository {
    client: FirestoreClient,
    collection: &'static str,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            client,
            collection: "jobs",
        }
    }

    pub async fn get(&self, job_id: JobId) -> FirestoreResult<Option<JobRecord>> {
        let doc = self
            .client
            .get_document(self.collection, &job_id.get().to_string())
            .await?;
        doc.map(|d| document_to_job_record(&d)).transpose()
    }

    /// Arbitrary active corpus records, for the candidate-empty recovery path.
    pub async fn list_active(&self, limit: u32) -> FirestoreResult<Vec<JobRecord>> {
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![("active".to_string(), FieldFilterOp::Equal, true.to_firestore_value())],
                None,
                limit,
            )
            .await?;
        docs.iter().map(document_to_job_record).collect()
    }
}

fn document_to_job_record(doc: &Document) -> FirestoreResult<JobRecord> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::InvalidResponse("job document has no fields".to_string()))?;

    let job_id = fields
        .get("job_id")
        .and_then(i64::from_firestore_value)
        .map(JobId::new)
        .ok_or_else(|| FirestoreError::InvalidResponse("job document missing job_id".to_string()))?;

    let payload = fields
        .get("payload")
        .and_then(String::from_firestore_value)
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);

    Ok(JobRecord {
        job_id,
        active: fields.get("active").and_then(bool::from_firestore_value).unwrap_or(false),
        embedding: Vec::new(),
        payload,
    })
}

// ============================================================================
// Generation Queue (C5)
// ============================================================================

/// Patch fields applied alongside a `transition`'s status change.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub error: Option<String>,
    pub retry_count: Option<u32>,
    pub output_video_id: Option<JobId>,
    pub clear_lease: bool,
}

/// Durable store of `GenerationJob` records: enqueue, claim, transition,
/// reset_stale. Dedup (invariant 2) is enforced by a sibling
/// `generation_locks` collection keyed `{fingerprint}_{job_id}`, created
/// atomically alongside the job row via `batchWrite`'s `exists=false`
/// precondition — the same dual-document pattern as a slug index.
pub struct GenerationQueueRepository {
    client: FirestoreClient,
    collection: &'static str,
    locks_collection: &'static str,
}

impl GenerationQueueRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            client,
            collection: "generation_jobs",
            locks_collection: "generation_locks",
        }
    }

    /// Insert a new queued job. Fails `Duplicate` if `(fingerprint, job_id)`
    /// already has a live (non-failed) generation; fails `UserAtLimit` if
    /// the user is already at `MAX_USER_CONCURRENT`. The limit check is a
    /// soft quota (plain reads, no CAS) — an over-limit-by-one race is
    /// tolerated.
    pub async fn enqueue(&self, job: &GenerationJob) -> FirestoreResult<()> {
        let active = self.count_active_for_user(&job.user_id).await?;
        if active >= MAX_USER_CONCURRENT as usize {
            return Err(FirestoreError::UserAtLimit(job.user_id.clone()));
        }

        let lock_doc_name = self
            .client
            .full_document_name(self.locks_collection, &lock_doc_id(&job.query_fingerprint, job.job_id));
        let job_doc_name = self.client.full_document_name(self.collection, job.job_uuid.as_str());

        let mut lock_fields = HashMap::new();
        lock_fields.insert("fingerprint".to_string(), job.query_fingerprint.to_firestore_value());
        lock_fields.insert("job_id".to_string(), job.job_id.get().to_firestore_value());

        let writes = vec![
            Write {
                update: Some(Document {
                    name: Some(lock_doc_name),
                    fields: Some(lock_fields),
                    create_time: None,
                    update_time: None,
                }),
                delete: None,
                update_mask: None,
                current_document: Some(Precondition {
                    exists: Some(false),
                    update_time: None,
                }),
            },
            Write {
                update: Some(Document {
                    name: Some(job_doc_name),
                    fields: Some(generation_job_to_fields(job)),
                    create_time: None,
                    update_time: None,
                }),
                delete: None,
                update_mask: None,
                current_document: Some(Precondition {
                    exists: Some(false),
                    update_time: None,
                }),
            },
        ];

        match self.client.batch_write(writes).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_duplicate_conflict() => Err(FirestoreError::Duplicate(format!(
                "{}:{}",
                job.query_fingerprint, job.job_id
            ))),
            Err(e) => Err(e),
        }
    }

    /// Atomically select and lease the oldest eligible queued job. Retries
    /// the read-CAS-write on a lost race, since the loser's next query
    /// naturally returns the next-oldest candidate.
    pub async fn claim(&self, worker_id: &str) -> FirestoreResult<Option<GenerationJob>> {
        let cutoff = Utc::now() - Duration::seconds(jobvid_models::config::CLAIM_MIN_AGE_S);

        for _ in 0..MAX_CLAIM_ATTEMPTS {
            let docs = self
                .client
                .query_documents(
                    self.collection,
                    vec![
                        (
                            "status".to_string(),
                            FieldFilterOp::Equal,
                            GenerationStatus::Queued.as_str().to_firestore_value(),
                        ),
                        ("created_at".to_string(), FieldFilterOp::LessThan, cutoff.to_firestore_value()),
                    ],
                    Some(("created_at".to_string(), true)),
                    1,
                )
                .await?;

            let Some(doc) = docs.into_iter().next() else {
                return Ok(None);
            };

            let mut job = document_to_generation_job(&doc)?;
            let update_time = doc.update_time.clone();
            let now = Utc::now();

            let mut fields = HashMap::new();
            fields.insert("status".to_string(), GenerationStatus::Running.as_str().to_firestore_value());
            fields.insert("worker_id".to_string(), worker_id.to_firestore_value());
            fields.insert("started_at".to_string(), now.to_firestore_value());
            fields.insert("updated_at".to_string(), now.to_firestore_value());

            let mask = vec![
                "status".to_string(),
                "worker_id".to_string(),
                "started_at".to_string(),
                "updated_at".to_string(),
            ];

            match self
                .client
                .update_document_with_precondition(
                    self.collection,
                    job.job_uuid.as_str(),
                    fields,
                    Some(mask),
                    update_time.as_deref(),
                )
                .await
            {
                Ok(_) => {
                    job.status = GenerationStatus::Running;
                    job.worker_id = Some(worker_id.to_string());
                    job.started_at = Some(now);
                    job.updated_at = now;
                    return Ok(Some(job));
                }
                Err(e) if e.is_precondition_failed() => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Compare-and-set on status; a mismatch (already moved on, or lost a
    /// concurrent race) is a no-op, not an error.
    pub async fn transition(
        &self,
        job_uuid: &GenerationJobId,
        expected_from: GenerationStatus,
        to: GenerationStatus,
        patch: TransitionPatch,
    ) -> FirestoreResult<bool> {
        let doc = self.client.get_document(self.collection, job_uuid.as_str()).await?;
        let Some(doc) = doc else {
            return Ok(false);
        };

        let fields_ref = doc.fields.as_ref();
        let current_status = fields_ref
            .and_then(|f| f.get("status"))
            .and_then(String::from_firestore_value)
            .unwrap_or_default();
        if current_status != expected_from.as_str() {
            return Ok(false);
        }

        let now = Utc::now();
        let mut fields = HashMap::new();
        let mut mask = vec!["status".to_string(), "updated_at".to_string()];
        fields.insert("status".to_string(), to.as_str().to_firestore_value());
        fields.insert("updated_at".to_string(), now.to_firestore_value());

        if to.is_terminal() {
            fields.insert("completed_at".to_string(), now.to_firestore_value());
            mask.push("completed_at".to_string());
        }
        if let Some(error) = &patch.error {
            fields.insert("error".to_string(), error.to_firestore_value());
            mask.push("error".to_string());
        }
        if let Some(retry_count) = patch.retry_count {
            fields.insert("retry_count".to_string(), retry_count.to_firestore_value());
            mask.push("retry_count".to_string());
        }
        if let Some(video_id) = patch.output_video_id {
            fields.insert("output_video_id".to_string(), video_id.get().to_firestore_value());
            mask.push("output_video_id".to_string());
        }
        if patch.clear_lease {
            fields.insert("worker_id".to_string(), Value::NullValue(()));
            fields.insert("started_at".to_string(), Value::NullValue(()));
            mask.push("worker_id".to_string());
            mask.push("started_at".to_string());
        }

        match self
            .client
            .update_document_with_precondition(
                self.collection,
                job_uuid.as_str(),
                fields,
                Some(mask),
                doc.update_time.as_deref(),
            )
            .await
        {
            Ok(_) => {
                if to == GenerationStatus::Failed {
                    self.release_lock(fields_ref).await;
                }
                Ok(true)
            }
            Err(e) if e.is_precondition_failed() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every job still `running` past `threshold` goes back to `queued`
    /// with a bumped `retry_count` and a cleared lease.
    pub async fn reset_stale(&self, threshold: Duration) -> FirestoreResult<u64> {
        let cutoff = Utc::now() - threshold;
        let docs = self
            .client
            .query_documents(
                self.collection,
                vec![
                    (
                        "status".to_string(),
                        FieldFilterOp::Equal,
                        GenerationStatus::Running.as_str().to_firestore_value(),
                    ),
                    ("started_at".to_string(), FieldFilterOp::LessThan, cutoff.to_firestore_value()),
                ],
                None,
                SCAN_LIMIT,
            )
            .await?;

        let mut reset_count = 0u64;
        for doc in docs {
            let Some(job_uuid) = doc.name.as_deref().and_then(|n| n.rsplit('/').next()) else {
                continue;
            };
            let retry_count = doc
                .fields
                .as_ref()
                .and_then(|f| f.get("retry_count"))
                .and_then(u32::from_firestore_value)
                .unwrap_or(0);

            let mut fields = HashMap::new();
            fields.insert("status".to_string(), GenerationStatus::Queued.as_str().to_firestore_value());
            fields.insert("retry_count".to_string(), (retry_count + 1).to_firestore_value());
            fields.insert("worker_id".to_string(), Value::NullValue(()));
            fields.insert("started_at".to_string(), Value::NullValue(()));
            fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

            let mask = vec![
                "status".to_string(),
                "retry_count".to_string(),
                "worker_id".to_string(),
                "started_at".to_string(),
                "updated_at".to_string(),
            ];

            match self
                .client
                .update_document_with_precondition(self.collection, job_uuid, fields, Some(mask), doc.update_time.as_deref())
                .await
            {
                Ok(_) => reset_count += 1,
                Err(e) if e.is_precondition_failed() => {}
                Err(e) => return Err(e),
            }
        }

        Ok(reset_count)
    }

    async fn count_active_for_user(&self, user_id: &str) -> FirestoreResult<usize> {
        let mut total = 0usize;
        for status in [GenerationStatus::Queued, GenerationStatus::Running] {
            let docs = self
                .client
                .query_documents(
                    self.collection,
                    vec![
                        ("user_id".to_string(), FieldFilterOp::Equal, user_id.to_firestore_value()),
                        ("status".to_string(), FieldFilterOp::Equal, status.as_str().to_firestore_value()),
                    ],
                    None,
                    MAX_USER_CONCURRENT + 1,
                )
                .await?;
            total += docs.len();
        }
        Ok(total)
    }

    async fn release_lock(&self, fields: Option<&HashMap<String, Value>>) {
        let Some(fields) = fields else { return };
        let fingerprint = fields.get("query_fingerprint").and_then(String::from_firestore_value);
        let job_id = fields.get("job_id").and_then(i64::from_firestore_value).map(JobId::new);
        if let (Some(fp), Some(job_id)) = (fingerprint, job_id) {
            let _ = self
                .client
                .delete_document(self.locks_collection, &lock_doc_id(&fp, job_id))
                .await;
        }
    }
}

fn generation_job_to_fields(job: &GenerationJob) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("job_uuid".to_string(), job.job_uuid.as_str().to_firestore_value());
    fields.insert("job_id".to_string(), job.job_id.get().to_firestore_value());
    fields.insert("template_id".to_string(), job.template_id.to_firestore_value());
    fields.insert("query_fingerprint".to_string(), job.query_fingerprint.to_firestore_value());
    fields.insert("user_id".to_string(), job.user_id.to_firestore_value());
    fields.insert("status".to_string(), job.status.as_str().to_firestore_value());
    fields.insert("created_at".to_string(), job.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_firestore_value());
    fields.insert("retry_count".to_string(), job.retry_count.to_firestore_value());

    if let Some(started_at) = job.started_at {
        fields.insert("started_at".to_string(), started_at.to_firestore_value());
    }
    if let Some(completed_at) = job.completed_at {
        fields.insert("completed_at".to_string(), completed_at.to_firestore_value());
    }
    if let Some(output_video_id) = job.output_video_id {
        fields.insert("output_video_id".to_string(), output_video_id.get().to_firestore_value());
    }
    if let Some(ref worker_id) = job.worker_id {
        fields.insert("worker_id".to_string(), worker_id.to_firestore_value());
    }
    if let Some(ref error) = job.error {
        fields.insert("error".to_string(), error.to_firestore_value());
    }

    fields
}

fn document_to_generation_job(doc: &Document) -> FirestoreResult<GenerationJob> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::InvalidResponse("generation job document has no fields".to_string()))?;

    let get_string = |key: &str| -> String {
        fields.get(key).and_then(String::from_firestore_value).unwrap_or_default()
    };

    let status = match get_string("status").as_str() {
        "running" => GenerationStatus::Running,
        "uploaded" => GenerationStatus::Uploaded,
        "indexed" => GenerationStatus::Indexed,
        "ready" => GenerationStatus::Ready,
        "failed" => GenerationStatus::Failed,
        _ => GenerationStatus::Queued,
    };

    Ok(GenerationJob {
        job_uuid: GenerationJobId::from_string(get_string("job_uuid")),
        job_id: JobId::new(
            fields
                .get("job_id")
                .and_then(i64::from_firestore_value)
                .unwrap_or_default(),
        ),
        template_id: get_string("template_id"),
        query_fingerprint: get_string("query_fingerprint"),
        user_id: get_string("user_id"),
        status,
        created_at: fields
            .get("created_at")
            .and_then(DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
        updated_at: fields
            .get("updated_at")
            .and_then(DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
        started_at: fields.get("started_at").and_then(DateTime::from_firestore_value),
        completed_at: fields.get("completed_at").and_then(DateTime::from_firestore_value),
        output_video_id: fields
            .get("output_video_id")
            .and_then(i64::from_firestore_value)
            .map(JobId::new),
        retry_count: fields
            .get("retry_count")
            .and_then(u32::from_firestore_value)
            .unwrap_or(0),
        worker_id: fields.get("worker_id").and_then(String::from_firestore_value),
        error: fields.get("error").and_then(String::from_firestore_value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_fields_roundtrip_job_id() {
        let view = View::seen_now("user-1", JobId::new(42));
        let fields = view_to_fields(&view);
        let job_id = fields.get("job_id").and_then(i64::from_firestore_value);
        assert_eq!(job_id, Some(42));
    }

    #[test]
    fn generation_job_fields_roundtrip_through_document() {
        let job = GenerationJob::new(JobId::new(7), "spongebob", "abc123fingerprint", "user-9");
        let fields = generation_job_to_fields(&job);
        let doc = Document {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };
        let parsed = document_to_generation_job(&doc).unwrap();
        assert_eq!(parsed.job_id, job.job_id);
        assert_eq!(parsed.status, GenerationStatus::Queued);
        assert_eq!(parsed.query_fingerprint, job.query_fingerprint);
    }

    #[test]
    fn video_fields_roundtrip_through_document() {
        let video = Video::ready(JobId::new(3), "hls/3/master.m3u8", "political", GenerationJobId::new());
        let fields = video_to_fields(&video);
        let doc = Document {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };
        let parsed = document_to_video(&doc).unwrap();
        assert_eq!(parsed.video_id, video.video_id);
        assert_eq!(parsed.status, VideoStatus::Ready);
        assert_eq!(parsed.storage_manifest_key, video.storage_manifest_key);
    }

    #[test]
    fn lock_doc_id_is_deterministic_composite() {
        assert_eq!(lock_doc_id("fp123", JobId::new(5)), "fp123_5");
    }

    #[test]
    fn view_doc_id_is_deterministic_composite() {
        assert_eq!(view_doc_id("user-1", JobId::new(5)), "user-1_5");
    }
}
