//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for job processing with
//! tracing spans and contextual information. Keyed on `GenerationJobId`
//! (the `job_uuid` the claim loop owns), with the corpus `JobId` attached
//! once known — the two id spaces don't collapse until `output_video_id`
//! is set.

use jobvid_models::{GenerationJobId, JobId};
use tracing::{error, info, warn, Span};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_uuid: String,
    job_id: Option<i64>,
}

impl JobLogger {
    /// Create a new job logger for a claimed generation job.
    pub fn new(job_uuid: &GenerationJobId, job_id: JobId) -> Self {
        Self {
            job_uuid: job_uuid.to_string(),
            job_id: Some(job_id.get()),
        }
    }

    /// Log the start of a job operation.
    pub fn log_start(&self, message: &str) {
        info!(job_uuid = %self.job_uuid, job_id = ?self.job_id, "job started: {}", message);
    }

    /// Log a progress update during job execution.
    pub fn log_progress(&self, message: &str) {
        info!(job_uuid = %self.job_uuid, job_id = ?self.job_id, "job progress: {}", message);
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(job_uuid = %self.job_uuid, job_id = ?self.job_id, "job warning: {}", message);
    }

    /// Log an error during job execution.
    pub fn log_error(&self, message: &str) {
        error!(job_uuid = %self.job_uuid, job_id = ?self.job_id, "job error: {}", message);
    }

    /// Log the completion of a job operation.
    pub fn log_completion(&self, message: &str) {
        info!(job_uuid = %self.job_uuid, job_id = ?self.job_id, "job completed: {}", message);
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_uuid = %self.job_uuid, job_id = ?self.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_uuid = GenerationJobId::new();
        let logger = JobLogger::new(&job_uuid, JobId::new(42));

        assert_eq!(logger.job_uuid, job_uuid.to_string());
        assert_eq!(logger.job_id, Some(42));
    }
}
