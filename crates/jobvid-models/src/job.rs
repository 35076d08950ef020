//! Identifiers shared across the search/generation pipeline.
//!
//! Two distinct id spaces exist and must not be confused:
//! - `JobId` — the stable integer identifying an externally-authored `Job`
//!   and, by the `video_id == job_id` design note, its `Video` row too.
//! - `GenerationJobId` — the UUID primary key (`job_uuid`) of a
//!   `GenerationJob`, the core's own generation-request record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for an externally-authored job and, equivalently, its video
/// (`video_id == job_id`, preserved from the original design as a
/// deliberate simplification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for JobId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Alias naming the `video_id` field precisely where code is talking about
/// the catalog rather than the job corpus; same underlying id space.
pub type VideoId = JobId;

/// Primary key of a `GenerationJob` — the core's own UUID, never confused
/// with the integer `JobId` it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct GenerationJobId(pub String);

impl GenerationJobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GenerationJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GenerationJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GenerationJobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GenerationJobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_a_plain_integer() {
        let id = JobId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn generation_job_id_is_a_fresh_uuid_each_time() {
        let a = GenerationJobId::new();
        let b = GenerationJobId::new();
        assert_ne!(a, b);
    }
}
