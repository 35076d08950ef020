//! Shared numeric defaults. Each owning crate's `XConfig::from_env()` reads
//! env vars with these as fallbacks; kept here so coordinator, store, and
//! worker agree on the same numbers without copy-pasting literals.

/// Boundary for a "high-quality" vector-search match.
pub const SIMILARITY_THRESHOLD: f32 = 0.75;
/// Size of the returned job-id set per search.
pub const TARGET_COUNT: usize = 5;
/// Upper bound on generation enqueues triggered by a single search.
pub const MAX_GENERATE_PER_REQUEST: usize = 5;
/// Per-user in-flight (`queued`+`running`) generation limit.
pub const MAX_USER_CONCURRENT: u32 = 2;
/// K in top-K vector search.
pub const VECTOR_SEARCH_LIMIT: usize = 20;
/// Vector index recall budget (`numCandidates`).
pub const VECTOR_SEARCH_CANDIDATES: usize = 50;
/// Worker idle poll interval, seconds.
pub const POLL_INTERVAL_S: u64 = 5;
/// Stale-lease threshold, minutes.
pub const JOB_TIMEOUT_MIN: i64 = 10;
/// Per-job retry budget before a job is terminally `failed`.
pub const MAX_RETRIES: u32 = 3;
/// Auto-deletion TTL on `generation_jobs.created_at`, hours.
pub const QUEUE_TTL_H: i64 = 24;
/// Fixed embedding dimension across the system.
pub const EMBEDDING_DIM: usize = 768;
/// Rendering style pool `claim`/enqueue picks a template from.
pub const VIDEO_TEMPLATES: &[&str] = &["family_guy", "spongebob", "political"];
/// Grace window before a freshly-enqueued job is eligible to be claimed, to
/// avoid racing an eventually-consistent store's not-yet-visible write.
pub const CLAIM_MIN_AGE_S: i64 = 2;
/// Stale-lease sweep cadence, minutes.
pub const SWEEP_INTERVAL_MIN: i64 = 5;
