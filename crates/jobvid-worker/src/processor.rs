//! `process(job)`: read the job's description from the external corpus,
//! render it, upload the HLS bundle, and record the resulting `Video` row.

use std::path::PathBuf;

use jobvid_models::{GenerationJob, JobId, Video};
use jobvid_storage::R2Client;
use jobvid_store::{JobRepository, VideoRepository};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::renderer::RendererClient;

const MIN_DESCRIPTION_LEN: usize = 50;

pub struct Processor {
    pub jobs: JobRepository,
    pub videos: VideoRepository,
    pub storage: R2Client,
    pub renderer: RendererClient,
    pub work_dir: PathBuf,
}

impl Processor {
    /// Reads the job description, renders it, uploads the bundle, and
    /// returns the `Video` row to be inserted. The `running→ready`
    /// transition is the caller's responsibility, since it also owns the
    /// retry/failure decision on error.
    pub async fn process(&self, job: &GenerationJob) -> WorkerResult<Video> {
        let logger = JobLogger::new(&job.job_uuid, job.job_id);
        logger.log_start("claimed");

        let description = self.read_description(job.job_id).await?;

        let output_dir = self.work_dir.join(job.job_id.get().to_string());
        logger.log_progress("rendering");
        let hls_dir = self
            .renderer
            .generate(&description, &output_dir, &job.job_id.get().to_string())
            .await?;

        logger.log_progress("uploading");
        let manifest_key = self
            .storage
            .upload_hls_bundle(&hls_dir, &job.job_id.get().to_string())
            .await?;

        let video = Video::ready(
            job.job_id,
            manifest_key,
            job.template_id.clone(),
            job.job_uuid.clone(),
        );
        self.videos.create(&video).await?;

        if let Err(e) = tokio::fs::remove_dir_all(&output_dir).await {
            logger.log_warning(&format!("failed to clean up temp dir: {e}"));
        }

        logger.log_completion("rendered");
        Ok(video)
    }

    /// Read and validate the job description. A missing or too-short
    /// description is `InvalidDescription` — the caller treats this as an
    /// immediate, non-retried failure.
    async fn read_description(&self, job_id: JobId) -> WorkerResult<String> {
        let record = self.jobs.get(job_id).await?.ok_or_else(|| {
            WorkerError::InvalidDescription(format!("job {job_id} not found in corpus"))
        })?;

        let description = record.description().unwrap_or("").to_string();
        if description.len() < MIN_DESCRIPTION_LEN {
            return Err(WorkerError::InvalidDescription(format!(
                "job {job_id} description too short ({} chars, need {})",
                description.len(),
                MIN_DESCRIPTION_LEN
            )));
        }

        Ok(description)
    }
}
