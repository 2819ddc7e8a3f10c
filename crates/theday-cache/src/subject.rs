//! Per-subject materials cache with id-based change detection.

use std::sync::Arc;

use tracing::{debug, warn};

use theday_core::traits::store::KeyValueStore;
use theday_entity::materials::{Materials, MaterialsDiff, merge};

use crate::keys;
use crate::provider::StoreManager;

/// Outcome of [`SubjectCache::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// The stored listing changed (or was created).
    Updated(MaterialsDiff),
    /// The fresh listing has the same ids as the cached one; nothing written.
    NoChanges,
}

impl UpdateResult {
    /// Ids added by the update, empty when nothing changed.
    pub fn added(&self) -> Vec<String> {
        match self {
            Self::Updated(diff) => diff.added.iter().cloned().collect(),
            Self::NoChanges => Vec::new(),
        }
    }
}

/// Materials cache for the subjects of one class.
///
/// Store failures never escape: reads degrade to misses and writes are
/// dropped with a warning.
#[derive(Debug, Clone)]
pub struct SubjectCache {
    /// Backing store.
    store: Arc<StoreManager>,
    /// Class whose namespace the subjects live in.
    class_name: String,
}

impl SubjectCache {
    /// Create a cache scoped to `class_name`.
    pub fn new(store: Arc<StoreManager>, class_name: impl Into<String>) -> Self {
        Self {
            store,
            class_name: class_name.into(),
        }
    }

    /// The class namespace.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Cached materials of `subject`, or `None` for a blank subject,
    /// an absent entry, or an unreadable entry.
    pub async fn get(&self, subject: &str) -> Option<Materials> {
        if subject.trim().is_empty() {
            return None;
        }
        let key = keys::subject_materials(&self.class_name, subject);
        match self.store.get_json::<Materials>(&key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(subject, error = %e, "Unreadable subject cache entry, treating as miss");
                None
            }
        }
    }

    /// Store a fresh listing of `subject`.
    ///
    /// Without a previous entry the listing is inserted and every id counts
    /// as added. Otherwise the listing is merged into the cached one and the
    /// store is only written when ids were added or removed.
    pub async fn put(&self, subject: &str, materials: &Materials) -> UpdateResult {
        if subject.trim().is_empty() {
            return UpdateResult::NoChanges;
        }

        let previous = self.get(subject).await;
        let existed = previous.is_some();
        let outcome = merge(&previous.unwrap_or_default(), materials);

        if existed && outcome.diff.is_empty() {
            debug!(subject, "Subject materials unchanged");
            return UpdateResult::NoChanges;
        }

        let key = keys::subject_materials(&self.class_name, subject);
        if let Err(e) = self.store.set_json(&key, &outcome.merged).await {
            warn!(subject, error = %e, "Failed to persist subject materials");
        }

        debug!(
            subject,
            added = outcome.diff.added.len(),
            removed = outcome.diff.removed.len(),
            "Subject materials updated"
        );
        UpdateResult::Updated(outcome.diff)
    }

    /// Drop the cached listing of `subject`.
    pub async fn remove(&self, subject: &str) {
        let key = keys::subject_materials(&self.class_name, subject);
        if let Err(e) = self.store.remove(&key).await {
            warn!(subject, error = %e, "Failed to remove subject materials");
        }
    }
}
