//! Key-value store persisted as a single JSON document.
//!
//! The whole map is kept in memory and rewritten on every mutation through
//! a temporary file and a rename, so a crash never leaves a torn document.
//! Total key and value bytes are capped by a quota, like browser storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use theday_core::config::store::FileStoreConfig;
use theday_core::error::{AppError, ErrorKind};
use theday_core::result::AppResult;
use theday_core::traits::store::KeyValueStore;

/// File-persisted store.
#[derive(Debug)]
pub struct FileStore {
    /// Path of the JSON document.
    path: PathBuf,
    /// Maximum total key + value bytes.
    quota_bytes: u64,
    /// In-memory view of the document.
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store described by the configuration.
    pub async fn open(config: &FileStoreConfig) -> AppResult<Self> {
        Self::open_at(&config.path, config.quota_bytes).await
    }

    /// Open (or create) a store at `path` with the given quota.
    pub async fn open_at(path: impl AsRef<Path>, quota_bytes: u64) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create store directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let entries = match fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Store document is malformed, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read store: {}", path.display()),
                    e,
                ));
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened file store");
        Ok(Self {
            path,
            quota_bytes,
            entries: RwLock::new(entries),
        })
    }

    /// Bytes currently used by keys and values.
    pub async fn used_bytes(&self) -> u64 {
        let entries = self.entries.read().await;
        footprint(&entries)
    }

    /// Write the document atomically.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let json = serde_json::to_vec(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write store: {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace store: {}", self.path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn footprint(entries: &BTreeMap<String, String>) -> u64 {
    entries
        .iter()
        .map(|(k, v)| (k.len() + v.len()) as u64)
        .sum()
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn provider_type(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().await;

        let replaced = entries
            .get(key)
            .map(|old| (key.len() + old.len()) as u64)
            .unwrap_or(0);
        let needed = footprint(&entries) - replaced + (key.len() + value.len()) as u64;
        if needed > self.quota_bytes {
            return Err(AppError::quota_exceeded(format!(
                "Writing '{key}' needs {needed} bytes, quota is {}",
                self.quota_bytes
            )));
        }

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries).await {
            // Keep memory and disk consistent.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        let count = (before - entries.len()) as u64;
        if count > 0 {
            self.persist(&entries).await?;
        }
        debug!(prefix, count, "Removed keys with prefix");
        Ok(count)
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await
    }
}
