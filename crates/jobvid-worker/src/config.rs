//! Worker configuration.

use std::time::Duration;

use jobvid_models::config::{JOB_TIMEOUT_MIN, MAX_RETRIES, POLL_INTERVAL_S, SWEEP_INTERVAL_MIN};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Stable identity for this run, used as `GenerationJob.worker_id`.
    pub worker_id: String,
    /// Idle poll interval when `claim` returns nothing.
    pub poll_interval: Duration,
    /// Stale-lease threshold the in-process sweeper resets against.
    pub job_timeout: Duration,
    /// Cadence of the stale-lease sweep.
    pub sweep_interval: Duration,
    /// Per-job retry budget before a job is transitioned to `failed`.
    pub max_retries: u32,
    /// Timeout on the renderer RPC.
    pub render_timeout: Duration,
    /// Base URL of the renderer service.
    pub renderer_url: String,
    /// Work directory for temporary HLS output before upload.
    pub work_dir: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: format!("worker-{}", uuid::Uuid::new_v4()),
            poll_interval: Duration::from_secs(POLL_INTERVAL_S),
            job_timeout: Duration::from_secs(JOB_TIMEOUT_MIN as u64 * 60),
            sweep_interval: Duration::from_secs(SWEEP_INTERVAL_MIN as u64 * 60),
            max_retries: MAX_RETRIES,
            render_timeout: Duration::from_secs(300),
            renderer_url: "http://localhost:9000".to_string(),
            work_dir: "/tmp/jobvid".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_id: std::env::var("WORKER_ID").unwrap_or(defaults.worker_id),
            poll_interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(POLL_INTERVAL_S),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("JOB_TIMEOUT_MIN")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(JOB_TIMEOUT_MIN as u64)
                    * 60,
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("SWEEP_INTERVAL_MIN")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(SWEEP_INTERVAL_MIN as u64)
                    * 60,
            ),
            max_retries: std::env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_RETRIES),
            render_timeout: Duration::from_secs(
                std::env::var("RENDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            renderer_url: std::env::var("RENDERER_URL")
                .unwrap_or_else(|_| defaults.renderer_url),
            work_dir: std::env::var("WORKER_WORK_DIR").unwrap_or(defaults.work_dir),
        }
    }
}
