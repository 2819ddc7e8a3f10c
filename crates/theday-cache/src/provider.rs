//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use theday_core::config::store::StoreConfig;
use theday_core::error::AppError;
use theday_core::result::AppResult;
use theday_core::traits::store::KeyValueStore;

/// Store manager that wraps the configured key-value backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store");
                Arc::new(crate::memory::MemoryStore::new(&config.memory))
            }
            #[cfg(feature = "file")]
            "file" => {
                info!(path = %config.file.path, "Initializing file store");
                Arc::new(crate::file::FileStore::open(&config.file).await?)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, file"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_provider(provider: Arc<dyn KeyValueStore>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner backend.
    pub fn provider(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl KeyValueStore for StoreManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key).await
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        self.inner.has(key).await
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64> {
        self.inner.remove_prefix(prefix).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theday_core::error::ErrorKind;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = StoreConfig {
            provider: "redis".to_string(),
            ..StoreConfig::default()
        };
        let err = StoreManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_memory_provider_dispatch() {
        let config = StoreConfig {
            provider: "memory".to_string(),
            ..StoreConfig::default()
        };
        let manager = StoreManager::new(&config).await.unwrap();
        assert_eq!(manager.provider_type(), "memory");
        manager.set("a", "1").await.unwrap();
        assert_eq!(manager.get("a").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_default_provider_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::default();
        config.file.path = dir.path().join("store.json").display().to_string();

        let manager = StoreManager::new(&config).await.unwrap();
        assert_eq!(manager.provider_type(), "file");
        manager.set("theday:classes", "[]").await.unwrap();

        let reopened = StoreManager::new(&config).await.unwrap();
        assert_eq!(
            reopened.get("theday:classes").await.unwrap(),
            Some("[]".to_string())
        );
    }
}
