//! Job executor: the claim loop plus the in-process stale-lease sweep.
//! One job at a time, blocking — single-threaded processing per worker,
//! since the renderer step owns one temp directory and is itself
//! CPU/GPU-bound.

use std::time::Instant;

use jobvid_models::GenerationStatus;
use jobvid_store::{GenerationQueueRepository, TransitionPatch};
use tracing::{error, info, warn};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::processor::Processor;
use crate::sweeper::Sweeper;

pub struct JobExecutor {
    config: WorkerConfig,
    queue: GenerationQueueRepository,
    processor: Processor,
    sweeper: Sweeper,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl JobExecutor {
    pub fn new(
        config: WorkerConfig,
        queue: GenerationQueueRepository,
        processor: Processor,
        sweeper: Sweeper,
    ) -> Self {
        let (shutdown, _) = tokio::sync::watch::channel(false);
        Self {
            config,
            queue,
            processor,
            sweeper,
            shutdown,
        }
    }

    /// Signal the main loop to stop after the in-flight job, if any.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Main loop: `if due, sweep; job ← claim(); if none, sleep; else
    /// process`.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(worker_id = %self.config.worker_id, "starting job executor");

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut last_sweep = Instant::now() - self.config.sweep_interval;

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            if last_sweep.elapsed() >= self.config.sweep_interval {
                if let Err(e) = self.sweeper.sweep().await {
                    warn!("stale-lease sweep failed: {}", e);
                }
                last_sweep = Instant::now();
            }

            let job = match self.queue.claim(&self.config.worker_id).await {
                Ok(job) => job,
                Err(e) => {
                    error!("failed to claim job: {}", e);
                    tokio::time::sleep(self.config.poll_interval).await;
                    continue;
                }
            };

            let Some(job) = job else {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    _ = shutdown_rx.changed() => {}
                }
                continue;
            };

            match self.processor.process(&job).await {
                Ok(video) => {
                    let transitioned = self
                        .queue
                        .transition(
                            &job.job_uuid,
                            GenerationStatus::Running,
                            GenerationStatus::Ready,
                            TransitionPatch {
                                error: None,
                                retry_count: None,
                                output_video_id: Some(video.video_id),
                                clear_lease: false,
                            },
                        )
                        .await;
                    if let Err(e) = transitioned {
                        error!(job_uuid = %job.job_uuid, "failed to transition job to ready: {}", e);
                    }
                }
                Err(e) => {
                    self.handle_failure(&job.job_uuid, job.retry_count, &e.to_string(), matches!(
                        e,
                        crate::error::WorkerError::InvalidDescription(_)
                    ))
                    .await;
                }
            }
        }

        info!("job executor stopped");
        Ok(())
    }

    /// An invalid description fails immediately and is never retried; any
    /// other error during processing retries up to `MAX_RETRIES`, then
    /// fails.
    async fn handle_failure(
        &self,
        job_uuid: &jobvid_models::GenerationJobId,
        retry_count: u32,
        error: &str,
        permanent: bool,
    ) {
        let (to, patch) = if permanent || retry_count >= self.config.max_retries {
            (
                GenerationStatus::Failed,
                TransitionPatch {
                    error: Some(error.to_string()),
                    retry_count: None,
                    output_video_id: None,
                    clear_lease: true,
                },
            )
        } else {
            (
                GenerationStatus::Queued,
                TransitionPatch {
                    error: Some(error.to_string()),
                    retry_count: Some(retry_count + 1),
                    output_video_id: None,
                    clear_lease: true,
                },
            )
        };

        warn!(job_uuid = %job_uuid, to = to.as_str(), "job failed: {}", error);

        if let Err(e) = self
            .queue
            .transition(job_uuid, GenerationStatus::Running, to, patch)
            .await
        {
            error!(job_uuid = %job_uuid, "failed to transition failed job: {}", e);
        }
    }
}
