//! Key-value store trait for the client-side persisted state.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for string key-value stores (in-memory or file-persisted).
///
/// Values are opaque strings; structured values are stored as JSON.
/// Entries never expire on their own: every removal is explicit.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "memory", "file").
    fn provider_type(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn has(&self, key: &str) -> AppResult<bool>;

    /// Remove every key starting with `prefix`. Returns the number removed.
    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64>;

    /// Remove all entries.
    async fn clear(&self) -> AppResult<()>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}
