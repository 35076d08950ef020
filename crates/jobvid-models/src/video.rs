//! The video catalog record (C4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GenerationJobId, JobId, VideoId};

/// `Video.status`. A video is either not yet rendered (`pending`, meaning no
/// row exists yet — callers observe this as "not found") or `ready`
/// (terminal: created once by the worker on a successful render, never
/// mutated or deleted by the core thereafter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    #[default]
    Pending,
    Ready,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered, uploaded video available for playback. `video_id` is always
/// equal to the `JobId` it was generated for — there is no separate video
/// id space (Design Note, preserved as a deliberate simplification).
///
/// Only ever constructed with `status: Ready`; a "pending" video is
/// represented by the absence of a row, not a row with `status: Pending`
/// (invariant 1: exactly one `Video` per `job_id`, created once).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub video_id: VideoId,
    pub status: VideoStatus,
    pub storage_manifest_key: String,
    pub template_id: String,
    pub created_at: DateTime<Utc>,
    pub generation_job_id: GenerationJobId,
}

impl Video {
    /// Construct the terminal `ready` row written by the worker on
    /// successful render+upload.
    pub fn ready(
        job_id: JobId,
        storage_manifest_key: impl Into<String>,
        template_id: impl Into<String>,
        generation_job_id: GenerationJobId,
    ) -> Self {
        Self {
            video_id: job_id,
            status: VideoStatus::Ready,
            storage_manifest_key: storage_manifest_key.into(),
            template_id: template_id.into(),
            created_at: Utc::now(),
            generation_job_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_video_carries_job_id_as_video_id() {
        let job_id = JobId::new(99);
        let video = Video::ready(job_id, "videos/99/manifest.m3u8", "family_guy", GenerationJobId::new());
        assert_eq!(video.video_id, job_id);
        assert_eq!(video.status, VideoStatus::Ready);
    }
}
