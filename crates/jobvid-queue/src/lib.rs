//! Per-user soft generation concurrency guard, backed by Redis.
//!
//! The durable queue state (claim/transition/dedup) lives in `jobvid-store`;
//! this crate only provides a cheap, best-effort admission check so an
//! over-limit request can be rejected before it reaches Firestore.

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{JobQueue, QueueConfig};
