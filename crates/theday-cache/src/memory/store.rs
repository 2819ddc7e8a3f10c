//! In-memory key-value store using the moka crate.

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use theday_core::config::store::MemoryStoreConfig;
use theday_core::result::AppResult;
use theday_core::traits::store::KeyValueStore;

/// In-memory store; contents live as long as the process.
///
/// Entries past `max_capacity` are evicted without regard to which keys
/// hold session state, so this backend is meant for tests and ephemeral
/// runs. Persistent sessions use the file store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// The underlying moka cache.
    cache: Cache<String, String>,
}

impl MemoryStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.max_capacity).build();
        Self { cache }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64> {
        // Moka has no prefix scan, so collect matching keys first.
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.0.starts_with(prefix))
            .map(|entry| entry.0.to_string())
            .collect();

        let mut count = 0u64;
        for key in keys_to_remove {
            self.cache.remove(&key).await;
            count += 1;
        }

        debug!(prefix, count, "Removed keys with prefix");
        Ok(count)
    }

    async fn clear(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}
