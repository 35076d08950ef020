//! HTTP clients for the embedding provider (C1) and the vector search
//! index (C2).

use std::time::Duration;

use jobvid_models::config::EMBEDDING_DIM;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{MlError, MlResult};
use crate::types::{
    EmbeddingRequest, EmbeddingResponse, VectorCandidate, VectorSearchFilter, VectorSearchRequest,
    VectorSearchResponse,
};

/// Shared config shape for both outbound clients: each service gets its own
/// base URL but the retry/timeout knobs are the same idiom.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    pub embedding_url: String,
    pub vector_search_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            embedding_url: "http://localhost:8001".to_string(),
            vector_search_url: "http://localhost:8002".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

impl MlClientConfig {
    pub fn from_env() -> Self {
        Self {
            embedding_url: std::env::var("EMBEDDING_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            vector_search_url: std::env::var("VECTOR_SEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> MlResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = MlResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let delay = Duration::from_millis(200 * 2u64.pow(attempt));
                warn!(attempt = attempt + 1, ?delay, error = %e, "ml request failed, retrying");
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| MlError::RequestFailed("unknown error".to_string())))
}

/// Maps a query string to a fixed-dimension float vector (C1).
pub struct EmbeddingClient {
    http: Client,
    config: MlClientConfig,
}

impl EmbeddingClient {
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    /// `embed(text, task="retrieval_query") → vector<float, D>`.
    pub async fn embed(&self, text: &str) -> MlResult<Vec<f32>> {
        let url = format!("{}/embed", self.config.embedding_url);
        let request = EmbeddingRequest::retrieval_query("default", text, EMBEDDING_DIM);

        debug!(%url, "requesting embedding");

        let response = with_retry(self.config.max_retries, || async {
            self.http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| MlError::EmbeddingUnavailable(e.to_string()))
        })
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(MlError::EmbeddingUnavailable(format!("status {status}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MlError::InvalidResponse(e.to_string()))?;

        if parsed.vector.len() != EMBEDDING_DIM {
            return Err(MlError::EmbeddingMalformed {
                expected: EMBEDDING_DIM,
                actual: parsed.vector.len(),
            });
        }

        Ok(parsed.vector)
    }
}

/// Filtered top-K approximate-nearest-neighbour query over the job corpus
/// (C2), with the sentinel fallback the coordinator is required to tolerate.
pub struct VectorSearchClient {
    http: Client,
    config: MlClientConfig,
}

/// Sentinel score returned by the fallback path when the index is down.
pub const FALLBACK_SCORE: f32 = 0.5;

impl VectorSearchClient {
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    /// `topK(query_vec, filter, numCandidates, limit)`. Propagates
    /// `VectorIndexUnavailable` on transport failure rather than fabricating
    /// results here — the adapter has no access to the job corpus to
    /// source a fallback from. The caller (the search coordinator, which
    /// does have catalog/corpus access) is responsible for degrading to the
    /// documented sentinel (`score = FALLBACK_SCORE`) fallback on this
    /// error; see `jobvid-api::services::coordinator`.
    pub async fn top_k(
        &self,
        query_vec: Vec<f32>,
        filter: VectorSearchFilter,
        limit: usize,
        num_candidates: usize,
    ) -> MlResult<Vec<VectorCandidate>> {
        let url = format!("{}/search", self.config.vector_search_url);
        let request = VectorSearchRequest {
            vector: query_vec,
            filter,
            limit,
            num_candidates: num_candidates.max(limit),
        };

        with_retry(self.config.max_retries, || async {
            let response = self
                .http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| MlError::VectorIndexUnavailable(e.to_string()))?;

            if !response.status().is_success() {
                return Err(MlError::VectorIndexUnavailable(format!(
                    "status {}",
                    response.status()
                )));
            }

            let parsed: VectorSearchResponse = response
                .json()
                .await
                .map_err(|e| MlError::InvalidResponse(e.to_string()))?;
            Ok(parsed.candidates)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.embedding_url, "http://localhost:8001");
        assert_eq!(config.vector_search_url, "http://localhost:8002");
    }

    #[test]
    fn fallback_score_is_the_documented_sentinel() {
        assert_eq!(FALLBACK_SCORE, 0.5);
    }

    #[tokio::test]
    async fn embed_returns_vector_of_expected_dimension() {
        let server = MockServer::start().await;
        let vector = vec![0.1_f32; EMBEDDING_DIM];
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"vector": vector})))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(MlClientConfig {
            embedding_url: server.uri(),
            ..MlClientConfig::default()
        })
        .unwrap();

        let result = client.embed("senior rust engineer").await.unwrap();
        assert_eq!(result.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn embed_rejects_wrong_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"vector": [0.1, 0.2]})))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(MlClientConfig {
            embedding_url: server.uri(),
            max_retries: 0,
            ..MlClientConfig::default()
        })
        .unwrap();

        let err = client.embed("query").await.unwrap_err();
        assert!(matches!(err, MlError::EmbeddingMalformed { .. }));
    }

    #[tokio::test]
    async fn top_k_propagates_unavailable_error_when_index_is_down() {
        let client = VectorSearchClient::new(MlClientConfig {
            vector_search_url: "http://127.0.0.1:1".to_string(),
            max_retries: 0,
            timeout: Duration::from_millis(200),
            ..MlClientConfig::default()
        })
        .unwrap();

        let err = client
            .top_k(vec![0.0; EMBEDDING_DIM], VectorSearchFilter::new(vec![]), 20, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::VectorIndexUnavailable(_)));
    }
}
