//! Application state.

use std::sync::Arc;

use jobvid_ml::{EmbeddingClient, MlClientConfig, VectorSearchClient};
use jobvid_queue::JobQueue;
use jobvid_storage::R2Client;
use jobvid_store::{
    FirestoreClient, GenerationQueueRepository, JobRepository, ViewRepository, VideoRepository,
};

use crate::config::ApiConfig;

/// Shared application state: one handle to each store/collaborator, cheaply
/// `Clone`d into every request.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<R2Client>,
    pub views: Arc<ViewRepository>,
    pub videos: Arc<VideoRepository>,
    pub jobs: Arc<JobRepository>,
    pub queue: Arc<GenerationQueueRepository>,
    pub concurrency: Arc<JobQueue>,
    pub embedding: Arc<EmbeddingClient>,
    pub vector_search: Arc<VectorSearchClient>,
    pub firestore: Arc<FirestoreClient>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = R2Client::from_env().await?;
        let firestore = FirestoreClient::from_env().await?;
        let concurrency = JobQueue::from_env()?;

        let ml_config = MlClientConfig::from_env();
        let embedding = EmbeddingClient::new(ml_config.clone())?;
        let vector_search = VectorSearchClient::new(ml_config)?;

        let views = ViewRepository::new(firestore.clone());
        let videos = VideoRepository::new(firestore.clone());
        let jobs = JobRepository::new(firestore.clone());
        let queue = GenerationQueueRepository::new(firestore.clone());

        Ok(Self {
            config,
            storage: Arc::new(storage),
            views: Arc::new(views),
            videos: Arc::new(videos),
            jobs: Arc::new(jobs),
            queue: Arc::new(queue),
            concurrency: Arc::new(concurrency),
            embedding: Arc::new(embedding),
            vector_search: Arc::new(vector_search),
            firestore: Arc::new(firestore),
        })
    }
}
