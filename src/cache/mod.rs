//! Best-effort key-value cache for rendered replies.
//!
//! Entries are keyed per user (`user:{id}:{purpose}`) and are never the
//! source of truth: a miss or a failure always falls back to the store.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// Lifetime of a memoized `/list` reply.
pub const LIST_TTL: Duration = Duration::from_secs(10 * 60);

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Deletes every key matching a glob pattern and returns how many went.
    async fn delete_pattern(&self, pattern: &str) -> anyhow::Result<u64>;
}

pub fn list_key(user_id: i64) -> String {
    format!("user:{}:list", user_id)
}

pub fn stats_key(user_id: i64) -> String {
    format!("user:{}:stats", user_id)
}

pub fn user_pattern(user_id: i64) -> String {
    format!("user:{}:*", user_id)
}

/// Drops the keys whose rendering a write to this user's expenses can change.
/// Failures are logged and swallowed.
pub async fn invalidate_user(cache: &dyn CacheStore, user_id: i64) {
    for key in [list_key(user_id), stats_key(user_id)] {
        if let Err(e) = cache.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to invalidate cache key");
        }
    }
}
