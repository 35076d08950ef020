//! Per-user soft concurrency guard, backed by a Redis counter.
//!
//! The durable queue (claim/transition/dedup-lock) lives in `jobvid-store`'s
//! `GenerationQueueRepository`, which enforces correctness even if this
//! counter is wrong or unavailable. This guard exists purely to reject an
//! obviously-over-limit request cheaply, before it reaches Firestore.

use redis::AsyncCommands;
use tracing::{debug, warn};

use crate::error::{QueueError, QueueResult};

/// Counter TTL: a crashed process that incremented but never decremented
/// self-heals after this window instead of permanently wedging a user.
const COUNTER_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub redis_url: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

fn counter_key(user_id: &str) -> String {
    format!("jobvid:concurrency:{}", user_id)
}

/// Soft per-user generation concurrency counter.
#[derive(Clone)]
pub struct JobQueue {
    client: redis::Client,
    #[allow(dead_code)]
    config: QueueConfig,
}

impl JobQueue {
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// Try to acquire one concurrency slot for `user_id`.
    ///
    /// Returns `Ok(true)` if the slot was acquired (count was below `limit`
    /// and has now been incremented). Returns `Ok(false)` if the user is
    /// already at `limit` (the counter is left unchanged).
    pub async fn try_acquire(&self, user_id: &str, limit: u32) -> QueueResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = counter_key(user_id);

        let current: u32 = conn.get(&key).await.unwrap_or(0);
        if current >= limit {
            warn!("Generation concurrency limit reached for user {}", user_id);
            return Ok(false);
        }

        let new_count: u32 = conn.incr(&key, 1).await?;
        conn.expire::<_, ()>(&key, COUNTER_TTL_SECS as i64).await?;

        if new_count > limit {
            // Lost a race against a concurrent acquire; back out and report denial.
            conn.decr::<_, ()>(&key, 1).await?;
            return Ok(false);
        }

        debug!("Acquired concurrency slot for user {} ({}/{})", user_id, new_count, limit);
        Ok(true)
    }

    /// Release a concurrency slot for `user_id`, e.g. once a generation
    /// reaches a terminal status.
    pub async fn release(&self, user_id: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = counter_key(user_id);

        let remaining: i64 = conn.decr(&key, 1).await?;
        if remaining <= 0 {
            conn.del::<_, ()>(&key).await?;
        }

        debug!("Released concurrency slot for user {}", user_id);
        Ok(())
    }

    /// Current in-flight count for a user, for diagnostics.
    pub async fn current(&self, user_id: &str) -> QueueResult<u32> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let count: u32 = conn.get(counter_key(user_id)).await.unwrap_or(0);
        Ok(count)
    }

    /// Ping the connection, used by the health check handler.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_key_is_namespaced_per_user() {
        assert_eq!(counter_key("user_1"), "jobvid:concurrency:user_1");
        assert_ne!(counter_key("user_1"), counter_key("user_2"));
    }

    #[test]
    fn config_from_env_falls_back_to_localhost() {
        std::env::remove_var("REDIS_URL");
        let config = QueueConfig::from_env();
        assert_eq!(config.redis_url, "redis://localhost:6379");
    }
}
