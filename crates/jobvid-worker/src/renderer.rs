//! Client for the renderer RPC: `POST /generate { description,
//! output_path, output_name } → { video_path }`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async, RetryConfig, RetryResult};

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    description: &'a str,
    output_path: &'a str,
    output_name: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    video_path: String,
}

/// Thin RPC client over the renderer service. The renderer itself owns
/// whatever model/pipeline produces the HLS bundle; this crate only knows
/// its HTTP contract.
pub struct RendererClient {
    http: Client,
    config: RendererConfig,
}

impl RendererClient {
    pub fn new(config: RendererConfig) -> WorkerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkerError::RenderFailed(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Renders `description` and returns the local directory containing
    /// `master.m3u8`, its renditions, `.ts` segments, and `poster.jpg`.
    pub async fn generate(
        &self,
        description: &str,
        output_path: &Path,
        output_name: &str,
    ) -> WorkerResult<PathBuf> {
        let url = format!("{}/generate", self.config.base_url);
        let output_path_str = output_path.to_string_lossy().into_owned();
        let request = GenerateRequest {
            description,
            output_path: &output_path_str,
            output_name,
        };

        debug!(%url, %output_name, "invoking renderer");

        let retry_config = RetryConfig::new("renderer_generate").with_max_retries(1);
        let result = retry_async(&retry_config, || async {
            let response = self
                .http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| WorkerError::RenderFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(WorkerError::RenderFailed(format!(
                    "status {}",
                    response.status()
                )));
            }

            response
                .json::<GenerateResponse>()
                .await
                .map_err(|e| WorkerError::RenderFailed(e.to_string()))
        })
        .await;

        let response = match result {
            RetryResult::Success(r) => r,
            RetryResult::Failed { error, .. } => return Err(error),
        };

        if response.video_path.trim().is_empty() {
            return Err(WorkerError::RenderFailed(
                "renderer returned no video path".to_string(),
            ));
        }

        // `video_path` points at the master playlist; the HLS bundle is its
        // parent directory.
        let video_path = PathBuf::from(response.video_path);
        let hls_dir = video_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(video_path);

        Ok(hls_dir)
    }
}
