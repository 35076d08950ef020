//! Stale-lease sweeper: periodically returns abandoned `running` jobs to
//! `queued` rather than marking them failed outright.

use std::time::Duration;

use jobvid_store::{FirestoreResult, GenerationQueueRepository};
use tracing::info;

pub struct Sweeper {
    queue: GenerationQueueRepository,
    threshold: Duration,
}

impl Sweeper {
    pub fn new(queue: GenerationQueueRepository, threshold: Duration) -> Self {
        Self { queue, threshold }
    }

    /// One sweep cycle. Safe to call on any cadence: `T_stale` is far
    /// larger than the longest legitimate render, and `process(job)` is
    /// idempotent under a duplicate claim if this ever fires early.
    pub async fn sweep(&self) -> FirestoreResult<u64> {
        let threshold = chrono::Duration::from_std(self.threshold)
            .unwrap_or_else(|_| chrono::Duration::minutes(10));
        let reset = self.queue.reset_stale(threshold).await?;
        if reset > 0 {
            info!(reset, "swept stale leases back to queued");
        }
        Ok(reset)
    }
}
