use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use async_trait::async_trait;

use super::CacheStore;

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis-backed cache. `ConnectionManager` reconnects on its own and is
/// cheap to clone, so every call works on its own clone.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Accepts either a bare `host:port` address or a full `redis://` URL.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let url = redis_url(address);
        let client = ::redis::Client::open(url.as_str())?;
        let mut conn = ConnectionManager::new(client).await?;

        let pong: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("Redis answered {}", pong);

        Ok(Self { conn })
    }
}

fn redis_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{}", address)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> anyhow::Result<u64> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed = 0;

        // Cursor SCAN, never KEYS.
        loop {
            let (next, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            for key in keys {
                let deleted: ::redis::RedisResult<u64> = conn.del(&key).await;
                match deleted {
                    Ok(n) => removed += n,
                    Err(e) => tracing::error!(key = %key, error = %e, "Failed to delete cache key"),
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}
