//! Cloudflare R2 storage client.
//!
//! This crate provides:
//! - HLS bundle upload (public-read, long cache header)
//! - Object upload/download/delete/list
//! - Presigned URL generation

pub mod client;
pub mod error;

pub use client::{ObjectInfo, R2Client, R2Config};
pub use error::{StorageError, StorageResult};
