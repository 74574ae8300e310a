use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// In-memory response cache with a fixed time-to-live per entry
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Value)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value for `key` if it is younger than the TTL
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
                    return Some(value.clone())
                }
                None => return None,
                Some(_) => {}
            }
        }

        // Expired: evict
        let mut entries = self.entries.write().await;
        if let Some((stored_at, _)) = entries.get(key) {
            if stored_at.elapsed() >= self.ttl {
                entries.remove(key);
            }
        }
        None
    }

    pub async fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries
            .write()
            .await
            .insert(key.into(), (Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        assert!(cache.get("/currency-data").await.is_none());

        cache.insert("/currency-data", json!({"CAD": {"current": 1.36}})).await;
        assert_eq!(
            cache.get("/currency-data").await,
            Some(json!({"CAD": {"current": 1.36}}))
        );
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        cache.insert("key", json!(1)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(cache.get("key").await.is_none());
        assert!(cache.entries.read().await.is_empty());
    }
}
