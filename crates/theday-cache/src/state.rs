//! Typed access to the persisted client state.
//!
//! Every accessor is lenient: store failures and malformed values are
//! logged and read back as absent, and failed writes are dropped. The
//! in-memory state of the caller stays authoritative for the session.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use theday_core::traits::store::KeyValueStore;
use theday_entity::transcript::{ClassEntry, SemesterSelection, Transcript};

use crate::keys;
use crate::provider::StoreManager;

/// Persisted session state of one device.
#[derive(Debug, Clone)]
pub struct ClientState {
    /// Backing store.
    store: Arc<StoreManager>,
}

impl ClientState {
    /// Create a state accessor over `store`.
    pub fn new(store: Arc<StoreManager>) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<StoreManager> {
        &self.store
    }

    // ── Active class ───────────────────────────────────────

    /// Name of the active class.
    pub async fn active_class_name(&self) -> Option<String> {
        self.read_raw(&keys::active_class_name())
            .await
            .filter(|name| !name.trim().is_empty())
    }

    /// Persist the active class name.
    pub async fn set_active_class_name(&self, class_name: &str) {
        self.write_raw(&keys::active_class_name(), class_name).await;
    }

    // ── Class registry ─────────────────────────────────────

    /// Classes unlocked on this device, in registration order.
    pub async fn classes(&self) -> Vec<ClassEntry> {
        self.read_json(&keys::class_registry())
            .await
            .unwrap_or_default()
    }

    /// Append a class to the registry unless the exact `(class, id)` pair
    /// is already present. Returns whether the registry grew.
    pub async fn register_class(&self, entry: ClassEntry) -> bool {
        let mut classes = self.classes().await;
        if classes.contains(&entry) {
            return false;
        }
        classes.push(entry);
        self.write_json(&keys::class_registry(), &classes).await;
        true
    }

    /// First registry entry with the given class id.
    pub async fn find_class_by_id(&self, id: &str) -> Option<ClassEntry> {
        self.classes().await.into_iter().find(|c| c.id == id)
    }

    /// First registry entry with the given class name.
    pub async fn find_class_by_name(&self, class_name: &str) -> Option<ClassEntry> {
        self.classes()
            .await
            .into_iter()
            .find(|c| c.class == class_name)
    }

    // ── Transcripts ────────────────────────────────────────

    /// Generic active-transcript cache.
    pub async fn transcript(&self) -> Option<Transcript> {
        self.read_json(&keys::transcript()).await
    }

    /// Replace the generic active-transcript cache.
    pub async fn set_transcript(&self, transcript: &Transcript) {
        self.write_json(&keys::transcript(), transcript).await;
    }

    /// Drop the generic active-transcript cache.
    pub async fn remove_transcript(&self) {
        self.remove(&keys::transcript()).await;
    }

    /// Cached transcript of one class.
    pub async fn class_transcript(&self, class_name: &str) -> Option<Transcript> {
        self.read_json(&keys::class_transcript(class_name)).await
    }

    /// Cache the transcript of one class.
    pub async fn set_class_transcript(&self, class_name: &str, transcript: &Transcript) {
        self.write_json(&keys::class_transcript(class_name), transcript)
            .await;
    }

    /// Drop the cached transcript of one class.
    pub async fn remove_class_transcript(&self, class_name: &str) {
        self.remove(&keys::class_transcript(class_name)).await;
    }

    /// When the transcript caches were last reset (epoch ms).
    pub async fn transcript_stored_at(&self) -> Option<i64> {
        let raw = self.read_raw(&keys::transcript_stored_at()).await?;
        match raw.trim().parse() {
            Ok(ms) => Some(ms),
            Err(_) => {
                warn!(value = %raw, "Ignoring malformed transcript timestamp");
                None
            }
        }
    }

    /// Persist the transcript cache timestamp (epoch ms).
    pub async fn set_transcript_stored_at(&self, epoch_ms: i64) {
        self.write_raw(&keys::transcript_stored_at(), &epoch_ms.to_string())
            .await;
    }

    /// Drop every subject cache of one class. Returns how many were removed.
    pub async fn purge_subject_namespace(&self, class_name: &str) -> u64 {
        let prefix = keys::subject_namespace(class_name);
        match self.store.remove_prefix(&prefix).await {
            Ok(count) => count,
            Err(e) => {
                warn!(class = class_name, error = %e, "Failed to purge subject caches");
                0
            }
        }
    }

    // ── Semester preferences ───────────────────────────────

    /// Selected semester.
    pub async fn semester(&self) -> SemesterSelection {
        self.read_raw(&keys::semester())
            .await
            .map(|raw| SemesterSelection::from_stored(&raw))
            .unwrap_or_default()
    }

    /// Persist the selected semester.
    pub async fn set_semester(&self, selection: SemesterSelection) {
        self.write_raw(&keys::semester(), &selection.to_stored())
            .await;
    }

    /// Abbreviations of the curated semester.
    pub async fn custom_semester_subjects(&self) -> Vec<String> {
        self.read_json(&keys::custom_semester_subjects())
            .await
            .unwrap_or_default()
    }

    /// Persist the abbreviations of the curated semester.
    pub async fn set_custom_semester_subjects(&self, abbreviations: &[String]) {
        self.write_json(&keys::custom_semester_subjects(), &abbreviations)
            .await;
    }

    /// Display name of the curated semester.
    pub async fn custom_semester_name(&self) -> Option<String> {
        self.read_raw(&keys::custom_semester_name()).await
    }

    /// Persist the display name of the curated semester.
    pub async fn set_custom_semester_name(&self, name: &str) {
        self.write_raw(&keys::custom_semester_name(), name).await;
    }

    /// Forget the curated semester entirely.
    pub async fn clear_custom_semester(&self) {
        self.remove(&keys::custom_semester_subjects()).await;
        self.remove(&keys::custom_semester_name()).await;
    }

    // ── Lenient primitives ─────────────────────────────────

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Store read failed");
                None
            }
        }
    }

    async fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            warn!(key, error = %e, "Store write failed");
        }
    }

    async fn read_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.store.get_json(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable store entry");
                None
            }
        }
    }

    async fn write_json<T: Serialize + Send + Sync>(&self, key: &str, value: &T) {
        if let Err(e) = self.store.set_json(key, value).await {
            warn!(key, error = %e, "Store write failed");
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key, error = %e, "Store remove failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theday_core::config::store::MemoryStoreConfig;
    use theday_entity::transcript::{Semester, Subject};

    use crate::memory::MemoryStore;

    fn make_state() -> ClientState {
        ClientState::new(Arc::new(StoreManager::from_provider(Arc::new(
            MemoryStore::new(&MemoryStoreConfig { max_capacity: 100 }),
        ))))
    }

    #[tokio::test]
    async fn test_registry_deduplicates_exact_pairs() {
        let state = make_state();
        assert!(state.register_class(ClassEntry::new("X", "1")).await);
        assert!(!state.register_class(ClassEntry::new("X", "1")).await);
        assert!(state.register_class(ClassEntry::new("X", "2")).await);
        assert_eq!(
            state.classes().await,
            vec![ClassEntry::new("X", "1"), ClassEntry::new("X", "2")]
        );
        assert_eq!(state.find_class_by_id("2").await, Some(ClassEntry::new("X", "2")));
        assert_eq!(state.find_class_by_name("X").await, Some(ClassEntry::new("X", "1")));
    }

    #[tokio::test]
    async fn test_registry_uses_wire_shape() {
        let state = make_state();
        state.register_class(ClassEntry::new("CS-2027", "abc")).await;
        let raw = state.store().get(&keys::class_registry()).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"class":"CS-2027","id":"abc"}]"#);
    }

    #[tokio::test]
    async fn test_class_transcript_roundtrip() {
        let state = make_state();
        let transcript = Transcript::new(vec![Semester {
            index: 1,
            subjects: vec![Subject::new("Data Structures", "DS")],
        }]);
        state.set_class_transcript("CS-2027", &transcript).await;
        assert_eq!(state.class_transcript("CS-2027").await, Some(transcript));
        state.remove_class_transcript("CS-2027").await;
        assert_eq!(state.class_transcript("CS-2027").await, None);
    }

    #[tokio::test]
    async fn test_timestamp_parsing() {
        let state = make_state();
        assert_eq!(state.transcript_stored_at().await, None);
        state.set_transcript_stored_at(1_700_000_000_000).await;
        assert_eq!(state.transcript_stored_at().await, Some(1_700_000_000_000));
        state
            .store()
            .set(&keys::transcript_stored_at(), "yesterday")
            .await
            .unwrap();
        assert_eq!(state.transcript_stored_at().await, None);
    }

    #[tokio::test]
    async fn test_semester_defaults_to_unset() {
        let state = make_state();
        assert_eq!(state.semester().await, SemesterSelection::Unset);
        state.set_semester(SemesterSelection::Custom).await;
        assert_eq!(
            state.store().get(&keys::semester()).await.unwrap().as_deref(),
            Some("-2")
        );
        assert_eq!(state.semester().await, SemesterSelection::Custom);
    }

    #[tokio::test]
    async fn test_blank_active_class_reads_as_absent() {
        let state = make_state();
        state.set_active_class_name("  ").await;
        assert_eq!(state.active_class_name().await, None);
        state.set_active_class_name("CS-2027").await;
        assert_eq!(state.active_class_name().await.as_deref(), Some("CS-2027"));
    }
}
