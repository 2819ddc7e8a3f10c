//! Client-side key-value store configuration.

use serde::{Deserialize, Serialize};

/// Top-level store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider type: `"file"` or `"memory"`.
    ///
    /// `"memory"` evicts under capacity pressure and forgets everything on
    /// exit, so it only suits tests and throwaway sessions.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// In-memory store configuration.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
    /// File-persisted store configuration.
    #[serde(default)]
    pub file: FileStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            memory: MemoryStoreConfig::default(),
            file: FileStoreConfig::default(),
        }
    }
}

/// In-memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

/// File-persisted store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Path of the JSON document holding every entry.
    #[serde(default = "default_path")]
    pub path: String,
    /// Maximum total size of keys and values in bytes.
    #[serde(default = "default_quota")]
    pub quota_bytes: u64,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            quota_bytes: default_quota(),
        }
    }
}

fn default_provider() -> String {
    "file".to_string()
}

fn default_max_capacity() -> u64 {
    10000
}

fn default_path() -> String {
    "data/theday-store.json".to_string()
}

fn default_quota() -> u64 {
    5 * 1024 * 1024
}
