use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::CacheConfig;

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, ttl: {:?}",
            max_capacity, ttl
        );
        Self { inner }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.memory.max_capacity,
            Duration::from_secs(config.default_ttl),
        )
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some(value) = self.inner.get(key).await {
            debug!("Cache hit: {}", key);
            CacheResult::Found(value)
        } else {
            debug!("Cache miss: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String) {
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: i64,
        name: String,
    }

    #[tokio::test]
    async fn typed_round_trip_and_remove() {
        let cache: Box<dyn ObjectCache> =
            Box::new(MokaCacheWrapper::new(100, Duration::from_secs(60)));
        let entry = Entry {
            id: 1,
            name: "alice".to_string(),
        };

        cache.insert("user:1".to_string(), &entry).await;
        assert_eq!(
            cache.get::<Entry>("user:1").await,
            CacheResult::Found(entry)
        );

        cache.remove("user:1").await;
        assert_eq!(cache.get::<Entry>("user:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn mismatched_type_is_reported() {
        let cache: Box<dyn ObjectCache> =
            Box::new(MokaCacheWrapper::new(100, Duration::from_secs(60)));
        cache
            .insert_raw("k".to_string(), "\"text\"".to_string())
            .await;
        assert_eq!(cache.get::<Entry>("k").await, CacheResult::ExistsButNoValue);
    }
}
