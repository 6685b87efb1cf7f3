use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CacheStore;

/// TTL map with glob deletion, mirroring the subset of Redis the bot uses.
/// Expired entries are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryCache {
    map: Mutex<HashMap<String, (Instant, String)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut map = self.map.lock().await;
        match map.get(key) {
            Some((expires_at, value)) if Instant::now() < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        self.map
            .lock()
            .await
            .insert(key.to_string(), (Instant::now() + ttl, value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.map.lock().await.remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> anyhow::Result<u64> {
        let mut map = self.map.lock().await;
        let before = map.len();
        map.retain(|key, _| !glob_match::glob_match(pattern, key));
        Ok((before - map.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_millis(20)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_pattern_is_scoped_to_user() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("user:1:list", "a", ttl).await.unwrap();
        cache.set("user:1:stats", "b", ttl).await.unwrap();
        cache.set("user:12:list", "c", ttl).await.unwrap();

        let removed = cache.delete_pattern("user:1:*").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.get("user:12:list").await.unwrap().as_deref(), Some("c"));
    }
}
