//! Generation worker binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobvid_storage::R2Client;
use jobvid_store::{FirestoreClient, GenerationQueueRepository, JobRepository, VideoRepository};
use jobvid_worker::{JobExecutor, Processor, RendererClient, RendererConfig, Sweeper, WorkerConfig};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("jobvid=info".parse().unwrap()))
        .init();

    info!("Starting jobvid-worker");

    let config = WorkerConfig::from_env();
    info!(worker_id = %config.worker_id, "worker config: {:?}", config);

    let firestore = match FirestoreClient::from_env().await {
        Ok(c) => c,
        Err(e) => {
            error!("failed to connect to Firestore: {}", e);
            std::process::exit(1);
        }
    };
    let storage = match R2Client::from_env().await {
        Ok(c) => c,
        Err(e) => {
            error!("failed to connect to object storage: {}", e);
            std::process::exit(1);
        }
    };
    let renderer = match RendererClient::new(RendererConfig {
        base_url: config.renderer_url.clone(),
        timeout: config.render_timeout,
    }) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to build renderer client: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.work_dir).await {
        error!("failed to create work dir {}: {}", config.work_dir, e);
        std::process::exit(1);
    }

    let queue = GenerationQueueRepository::new(firestore.clone());
    let processor = Processor {
        jobs: JobRepository::new(firestore.clone()),
        videos: VideoRepository::new(firestore.clone()),
        storage,
        renderer,
        work_dir: config.work_dir.clone().into(),
    };
    let sweeper = Sweeper::new(
        GenerationQueueRepository::new(firestore.clone()),
        config.job_timeout,
    );

    let executor = std::sync::Arc::new(JobExecutor::new(config, queue, processor, sweeper));

    let signal_executor = executor.clone();
    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        signal_executor.shutdown();
    });

    if let Err(e) = executor.run().await {
        error!("executor error: {}", e);
        std::process::exit(1);
    }

    shutdown_handle.await.ok();

    info!("worker shutdown complete");
}
