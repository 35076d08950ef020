//! The view ledger record (C3): `(user_id, job_id) → seen` facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobId;

/// A single `(user_id, job_id)` view fact. Unique on the pair; `mark_seen`
/// upserts so concurrent duplicate calls collapse onto one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub user_id: String,
    pub job_id: JobId,
    pub seen: bool,
    pub updated_at: DateTime<Utc>,
}

impl View {
    pub fn seen_now(user_id: impl Into<String>, job_id: JobId) -> Self {
        Self {
            user_id: user_id.into(),
            job_id,
            seen: true,
            updated_at: Utc::now(),
        }
    }
}

/// A page of `list_seen` results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenPage {
    pub job_ids: Vec<JobId>,
    pub total: u64,
}
