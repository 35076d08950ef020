//! The generation worker: claims queued jobs, renders them, uploads the
//! result, and records the finished `Video` row.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod processor;
pub mod renderer;
pub mod retry;
pub mod sweeper;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use processor::Processor;
pub use renderer::{RendererClient, RendererConfig};
pub use sweeper::Sweeper;
