//! The read-only `Job` corpus: authored by an external ingestion pipeline.
//! The core never creates or mutates these; they only ever flow out of the
//! vector search adapter and the worker's catalog read.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// A job description and its embedding, as owned by the external corpus.
/// The core treats `payload` opaquely except for the description text the
/// worker extracts at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub active: bool,
    pub embedding: Vec<f32>,
    pub payload: serde_json::Value,
}

impl JobRecord {
    /// Extract the human-readable job description from the opaque payload,
    /// the way the worker does before handing it to the renderer.
    pub fn description(&self) -> Option<&str> {
        self.payload.get("description").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn description_reads_from_payload() {
        let job = JobRecord {
            job_id: JobId::new(1),
            active: true,
            embedding: vec![0.1, 0.2],
            payload: json!({"description": "Senior Rust engineer"}),
        };
        assert_eq!(job.description(), Some("Senior Rust engineer"));
    }

    #[test]
    fn description_missing_is_none() {
        let job = JobRecord {
            job_id: JobId::new(1),
            active: true,
            embedding: vec![],
            payload: json!({}),
        };
        assert_eq!(job.description(), None);
    }
}
