//! Axum HTTP API server for the search-and-generate coordinator.
//!
//! This crate provides:
//! - The search endpoint (C6, orchestrating C1-C5)
//! - The view ledger endpoints (C3)
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::SearchCoordinator;
pub use state::AppState;
