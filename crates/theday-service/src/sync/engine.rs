//! Stale-while-revalidate sync of one subject's materials.
//!
//! A sync shows whatever is cached (or the caller's fallback) right away,
//! fetches the subject from the remote service, merges the result into the
//! cache by file id, and publishes the fresh listing together with the ids
//! that are new since the previous snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use theday_cache::{SubjectCache, UpdateResult};
use theday_core::config::SyncConfig;
use theday_core::error::AppError;
use theday_core::result::AppResult;
use theday_entity::materials::{Materials, MaterialsDiff};
use theday_remote::RemoteMaterialsClient;

use crate::context::SessionContext;

use super::flight::{FlightStatus, FlightTable};
use super::view::{SubjectView, SyncPhase};

/// How the remote listing is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncProtocol {
    /// One request for the whole listing.
    Single,
    /// Folder structure first, then files.
    Split,
}

/// How a sync invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The cache changed; carries the ids added and removed.
    Updated(MaterialsDiff),
    /// The remote listing matched the cache.
    Unchanged,
    /// The same subject is already being fetched; nothing was done.
    InFlight,
    /// The sync was superseded or cancelled and its result discarded.
    Aborted,
    /// The fetch failed; the view kept its data.
    Failed(AppError),
    /// The subject was blank.
    Ignored,
}

#[derive(Debug)]
struct EngineInner {
    cache: SubjectCache,
    remote: Arc<dyn RemoteMaterialsClient>,
    config: SyncConfig,
    flights: Mutex<FlightTable>,
    view: watch::Sender<SubjectView>,
}

/// Drives the materials view of one class.
///
/// Cloning is cheap; clones share the view and the flight table.
#[derive(Debug, Clone)]
pub struct SubjectSyncEngine {
    inner: Arc<EngineInner>,
}

impl SubjectSyncEngine {
    /// Create an engine over an explicit cache and client.
    pub fn new(
        cache: SubjectCache,
        remote: Arc<dyn RemoteMaterialsClient>,
        config: SyncConfig,
    ) -> Self {
        let (view, _) = watch::channel(SubjectView::default());
        Self {
            inner: Arc::new(EngineInner {
                cache,
                remote,
                config,
                flights: Mutex::new(FlightTable::default()),
                view,
            }),
        }
    }

    /// Create an engine for the subjects of `class_name`.
    pub fn for_class(ctx: &SessionContext, class_name: &str) -> Self {
        Self::new(
            ctx.subject_cache(class_name),
            Arc::clone(&ctx.remote),
            ctx.config.sync.clone(),
        )
    }

    /// Class whose subject caches this engine reads and writes.
    pub fn class_name(&self) -> &str {
        self.inner.cache.class_name()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<SubjectView> {
        self.inner.view.subscribe()
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> SubjectView {
        self.inner.view.borrow().clone()
    }

    /// Status of the latest fetch of `subject`.
    pub fn flight_status(&self, subject: &str) -> FlightStatus {
        self.flights().status(subject.trim())
    }

    /// Protocol configured for `subject`.
    pub fn protocol_for(&self, subject: &str) -> SyncProtocol {
        if self.inner.config.uses_split(subject) {
            SyncProtocol::Split
        } else {
            SyncProtocol::Single
        }
    }

    /// Sync `subject` with the protocol configured for it.
    pub async fn load(&self, subject: &str, fallback: Option<Materials>) -> SyncOutcome {
        let protocol = self.protocol_for(subject);
        self.run(subject, fallback, protocol).await
    }

    /// Single-phase sync of `subject`.
    pub async fn sync(&self, subject: &str, fallback: Option<Materials>) -> SyncOutcome {
        self.run(subject, fallback, SyncProtocol::Single).await
    }

    /// Two-phase sync of `subject`: folders first, then files.
    pub async fn split_sync(&self, subject: &str, fallback: Option<Materials>) -> SyncOutcome {
        self.run(subject, fallback, SyncProtocol::Split).await
    }

    /// Cancel the outstanding fetch, discarding its result.
    pub fn cancel(&self) {
        let mut flights = self.flights();
        if let Some(subject) = flights.abort_current() {
            info!(subject = %subject, "Sync cancelled");
            self.inner.view.send_modify(|view| {
                if view.subject.as_deref() == Some(subject.as_str()) {
                    view.phase = SyncPhase::Aborted;
                    view.loading = false;
                    view.fetching = false;
                }
            });
        }
    }

    #[instrument(skip(self, fallback), fields(class = %self.class_name()))]
    async fn run(
        &self,
        subject: &str,
        fallback: Option<Materials>,
        protocol: SyncProtocol,
    ) -> SyncOutcome {
        let subject = subject.trim();
        if subject.is_empty() {
            debug!("Ignoring sync of a blank subject");
            return SyncOutcome::Ignored;
        }

        let ticket = {
            let mut flights = self.flights();
            let Some(ticket) = flights.begin(subject) else {
                debug!(subject, "Fetch already in flight");
                return SyncOutcome::InFlight;
            };
            self.inner.view.send_replace(SubjectView::checking(subject));
            ticket
        };
        let generation = ticket.generation;

        // Cache check
        let cached = self.inner.cache.get(subject).await;
        let shown = self.publish(generation, |view| match (cached, fallback) {
            (Some(cached), _) if !cached.is_empty() => {
                view.data = Some(cached);
                view.phase = SyncPhase::CacheHit;
            }
            (_, Some(fallback)) => {
                view.data = Some(fallback);
                view.phase = SyncPhase::CacheMiss;
            }
            _ => {
                view.loading = true;
                view.phase = SyncPhase::CacheMiss;
            }
        });
        if !shown {
            return SyncOutcome::Aborted;
        }

        self.publish(generation, |view| view.phase = SyncPhase::Fetching);
        let fetched = tokio::select! {
            biased;
            () = ticket.cancel.cancelled() => None,
            result = self.fetch(subject, protocol, generation) => Some(result),
        };

        let materials = match fetched {
            None => {
                debug!(subject, "Discarding superseded fetch");
                return SyncOutcome::Aborted;
            }
            Some(Err(e)) if e.is_cancelled() => {
                debug!(subject, "Fetch aborted");
                self.finish(subject, generation, FlightStatus::Aborted);
                self.publish(generation, |view| {
                    view.phase = SyncPhase::Aborted;
                    view.loading = false;
                    view.fetching = false;
                });
                return SyncOutcome::Aborted;
            }
            Some(Err(e)) => {
                warn!(subject, error = %e, "Subject sync failed");
                self.finish(subject, generation, FlightStatus::Failed);
                let error = e.clone();
                self.publish(generation, |view| {
                    view.error = Some(error);
                    view.phase = SyncPhase::Failed;
                    view.loading = false;
                    view.fetching = false;
                });
                return SyncOutcome::Failed(e);
            }
            Some(Ok(materials)) => materials,
        };

        // Diffing
        if !self.publish(generation, |view| view.phase = SyncPhase::Diffing) {
            debug!(subject, "Discarding result of superseded fetch");
            return SyncOutcome::Aborted;
        }
        // A supersede landing during the write still persists this subject's
        // listing under its own key; the view is left to the newer sync.
        let result = self.inner.cache.put(subject, &materials).await;
        self.finish(subject, generation, FlightStatus::Done);

        let mut fresh = materials;
        fresh.prune_empty();
        let settled = self.publish(generation, |view| {
            if let UpdateResult::Updated(diff) = &result {
                view.data = Some(fresh);
                view.new_items = diff.added.iter().cloned().collect();
            }
            view.loading = false;
            view.fetching = false;
            view.phase = SyncPhase::Settled;
        });
        if !settled {
            return SyncOutcome::Aborted;
        }

        match result {
            UpdateResult::Updated(diff) => {
                info!(
                    subject,
                    added = diff.added.len(),
                    removed = diff.removed.len(),
                    "Subject materials updated"
                );
                SyncOutcome::Updated(diff)
            }
            UpdateResult::NoChanges => {
                debug!(subject, "Subject materials unchanged");
                SyncOutcome::Unchanged
            }
        }
    }

    async fn fetch(
        &self,
        subject: &str,
        protocol: SyncProtocol,
        generation: u64,
    ) -> AppResult<Materials> {
        match protocol {
            SyncProtocol::Single => self.inner.remote.fetch_materials(subject).await,
            SyncProtocol::Split => {
                let listing = self.inner.remote.fetch_folders(subject).await?;
                debug!(
                    subject,
                    folders = listing.folder_structure.len(),
                    "Folder structure received"
                );
                let skeleton = listing.folder_structure.clone();
                self.publish(generation, |view| {
                    view.folders = Some(skeleton);
                    view.phase = SyncPhase::FoldersReady;
                });

                let files = self
                    .inner
                    .remote
                    .fetch_files(subject, Some(&listing.folder_structure))
                    .await?;
                debug!(
                    subject,
                    total_files = files.metadata.total_files,
                    categories = files.metadata.categories,
                    "Files received"
                );
                Ok(files.files_data)
            }
        }
    }

    /// Apply `update` to the view if `generation` still owns it.
    fn publish(&self, generation: u64, update: impl FnOnce(&mut SubjectView)) -> bool {
        let flights = self.flights();
        if !flights.is_current(generation) {
            return false;
        }
        self.inner.view.send_modify(update);
        true
    }

    fn finish(&self, subject: &str, generation: u64, status: FlightStatus) {
        self.flights().finish(subject, generation, status);
    }

    fn flights(&self) -> MutexGuard<'_, FlightTable> {
        self.inner
            .flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theday_cache::StoreManager;
    use theday_cache::memory::MemoryStore;
    use theday_core::config::store::MemoryStoreConfig;
    use theday_core::error::ErrorKind;
    use theday_core::traits::store::KeyValueStore;
    use theday_entity::file::FileEntity;
    use theday_entity::folder::{FolderNode, FolderStructure};
    use theday_remote::mock::MockMaterialsClient;
    use theday_remote::{FilesListing, FilesMetadata, FolderListing};

    fn listing(category: &str, ids: &[&str]) -> Materials {
        Materials::new().with_category(
            category,
            ids.iter()
                .map(|id| FileEntity::new(*id, format!("{id}.pdf")))
                .collect(),
        )
    }

    fn setup() -> (SubjectSyncEngine, Arc<MockMaterialsClient>, SubjectCache) {
        let store = Arc::new(StoreManager::from_provider(Arc::new(MemoryStore::new(
            &MemoryStoreConfig { max_capacity: 100 },
        ))));
        let cache = SubjectCache::new(store, "CS-2027");
        let mock = Arc::new(MockMaterialsClient::new());
        let engine = SubjectSyncEngine::new(
            cache.clone(),
            mock.clone(),
            SyncConfig {
                split_subjects: vec!["ALGO".to_string()],
            },
        );
        (engine, mock, cache)
    }

    async fn wait_for_phase(engine: &SubjectSyncEngine, subject: &str, phase: SyncPhase) {
        let mut rx = engine.subscribe();
        rx.wait_for(|view| view.subject.as_deref() == Some(subject) && view.phase == phase)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_is_shown_before_fetch_resolves() {
        let (engine, mock, cache) = setup();
        cache.put("DS", &listing("Lecture1", &["a"])).await;
        mock.push_materials("DS", Ok(listing("Lecture1", &["a", "b"])));
        mock.hold("DS");

        let task = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", None).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Fetching).await;

        let view = engine.view();
        assert_eq!(view.data, Some(listing("Lecture1", &["a"])));
        assert!(!view.loading);
        assert!(view.fetching);

        mock.release("DS");
        let outcome = task.await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Updated(_)));
        let view = engine.view();
        assert_eq!(view.new_items, vec!["b".to_string()]);
        assert_eq!(view.phase, SyncPhase::Settled);
    }

    #[tokio::test]
    async fn test_fallback_used_on_cache_miss() {
        let (engine, mock, _) = setup();
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
        mock.hold("DS");

        let task = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", Some(listing("Static", &["s"]))).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Fetching).await;
        let view = engine.view();
        assert_eq!(view.data, Some(listing("Static", &["s"])));
        assert!(!view.loading);

        mock.release("DS");
        task.await.unwrap();
        assert_eq!(engine.view().data, Some(listing("Lecture1", &["a"])));
    }

    #[tokio::test]
    async fn test_second_sync_of_same_subject_is_dropped() {
        let (engine, mock, _) = setup();
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
        mock.hold("DS");

        let task = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", None).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Fetching).await;

        assert_eq!(engine.sync("DS", None).await, SyncOutcome::InFlight);
        assert_eq!(engine.flight_status("DS"), FlightStatus::Fetching);

        mock.release("DS");
        assert!(matches!(task.await.unwrap(), SyncOutcome::Updated(_)));
        assert_eq!(mock.calls("materials:DS"), 1);
        assert_eq!(engine.flight_status("DS"), FlightStatus::Done);
    }

    #[tokio::test]
    async fn test_switching_subject_discards_previous_fetch() {
        let (engine, mock, cache) = setup();
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
        mock.push_materials("OS", Ok(listing("Lab", &["x"])));
        mock.hold("DS");

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", None).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Fetching).await;

        let second = engine.sync("OS", None).await;
        assert!(matches!(second, SyncOutcome::Updated(_)));
        mock.release("DS");
        assert_eq!(first.await.unwrap(), SyncOutcome::Aborted);

        let view = engine.view();
        assert_eq!(view.subject.as_deref(), Some("OS"));
        assert_eq!(view.data, Some(listing("Lab", &["x"])));
        assert_eq!(view.error, None);
        assert_eq!(cache.get("DS").await, None);
        assert_eq!(engine.flight_status("DS"), FlightStatus::Aborted);
    }

    /// Memory store whose writes under `gated_suffix` wait for `open`.
    #[derive(Debug)]
    struct GatedStore {
        inner: MemoryStore,
        gated_suffix: &'static str,
        gate: tokio::sync::Semaphore,
    }

    impl GatedStore {
        fn open(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait::async_trait]
    impl KeyValueStore for GatedStore {
        fn provider_type(&self) -> &str {
            "gated"
        }

        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> AppResult<()> {
            if key.ends_with(self.gated_suffix) {
                let _permit = self.gate.acquire().await;
            }
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

    #[tokio::test]
    async fn test_switch_during_write_keeps_view_on_new_subject() {
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(&MemoryStoreConfig { max_capacity: 100 }),
            gated_suffix: ":DS",
            gate: tokio::sync::Semaphore::new(0),
        });
        let cache = SubjectCache::new(
            Arc::new(StoreManager::from_provider(store.clone())),
            "CS-2027",
        );
        let mock = Arc::new(MockMaterialsClient::new());
        let engine = SubjectSyncEngine::new(cache.clone(), mock.clone(), SyncConfig::default());
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
        mock.push_materials("OS", Ok(listing("Lab", &["x"])));

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", None).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Diffing).await;

        assert!(matches!(
            engine.sync("OS", None).await,
            SyncOutcome::Updated(_)
        ));
        store.open();
        assert_eq!(first.await.unwrap(), SyncOutcome::Aborted);

        // The write already under way lands under its own key only.
        assert_eq!(cache.get("DS").await, Some(listing("Lecture1", &["a"])));
        let view = engine.view();
        assert_eq!(view.subject.as_deref(), Some("OS"));
        assert_eq!(view.data, Some(listing("Lab", &["x"])));
        assert_eq!(view.new_items, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_data() {
        let (engine, mock, cache) = setup();
        cache.put("DS", &listing("Lecture1", &["a"])).await;
        mock.push_materials("DS", Err(AppError::external_service("status 500")));

        let outcome = engine.sync("DS", None).await;
        assert!(matches!(outcome, SyncOutcome::Failed(_)));

        let view = engine.view();
        assert_eq!(view.data, Some(listing("Lecture1", &["a"])));
        assert_eq!(view.phase, SyncPhase::Failed);
        assert!(view.error.is_some());
        assert!(!view.loading);
        assert!(!view.fetching);
        assert_eq!(engine.flight_status("DS"), FlightStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_error_is_swallowed() {
        let (engine, mock, _) = setup();
        mock.push_materials("DS", Err(AppError::cancelled("request aborted")));

        assert_eq!(engine.sync("DS", None).await, SyncOutcome::Aborted);
        let view = engine.view();
        assert_eq!(view.phase, SyncPhase::Aborted);
        assert_eq!(view.error, None);
    }

    #[tokio::test]
    async fn test_unchanged_listing_keeps_view() {
        let (engine, mock, cache) = setup();
        cache.put("DS", &listing("Lecture1", &["a"])).await;
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));

        assert_eq!(engine.sync("DS", None).await, SyncOutcome::Unchanged);
        let view = engine.view();
        assert_eq!(view.data, Some(listing("Lecture1", &["a"])));
        assert!(view.new_items.is_empty());
        assert_eq!(view.phase, SyncPhase::Settled);
    }

    #[tokio::test]
    async fn test_split_sync_sends_folder_structure() {
        let (engine, mock, _) = setup();
        let structure: FolderStructure = [FolderNode {
            id: "f1".to_string(),
            name: "Lecture1".to_string(),
            parent_id: Some("root".to_string()),
        }]
        .into_iter()
        .collect();
        mock.push_folders(
            "ALGO",
            Ok(FolderListing {
                folder_structure: structure.clone(),
                ..FolderListing::default()
            }),
        );
        mock.push_files(
            "ALGO",
            Ok(FilesListing {
                files_data: listing("Lecture1", &["a"]),
                metadata: FilesMetadata {
                    total_files: 1,
                    categories: 1,
                },
                ..FilesListing::default()
            }),
        );

        assert_eq!(engine.protocol_for("algo"), SyncProtocol::Split);
        let outcome = engine.load("ALGO", None).await;
        assert!(matches!(outcome, SyncOutcome::Updated(_)));
        assert_eq!(mock.last_folders_sent(), Some(structure.clone()));
        assert_eq!(mock.calls("materials:ALGO"), 0);

        let view = engine.view();
        assert_eq!(view.folders, Some(structure));
        assert_eq!(view.new_items, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_split_sync_fails_at_folders_phase() {
        let (engine, mock, _) = setup();
        mock.push_folders("ALGO", Err(AppError::timeout("folders phase")));

        let outcome = engine.split_sync("ALGO", None).await;
        assert!(matches!(outcome, SyncOutcome::Failed(ref e) if e.kind == ErrorKind::Timeout));
        assert_eq!(mock.calls("files:ALGO"), 0);
        assert_eq!(engine.view().data, None);
        assert!(!engine.view().loading);
    }

    #[tokio::test]
    async fn test_cancel_marks_view_aborted() {
        let (engine, mock, _) = setup();
        mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
        mock.hold("DS");

        let task = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sync("DS", None).await }
        });
        wait_for_phase(&engine, "DS", SyncPhase::Fetching).await;

        engine.cancel();
        assert_eq!(task.await.unwrap(), SyncOutcome::Aborted);
        let view = engine.view();
        assert_eq!(view.phase, SyncPhase::Aborted);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_blank_subject_is_ignored() {
        let (engine, mock, _) = setup();
        assert_eq!(engine.sync("   ", None).await, SyncOutcome::Ignored);
        assert_eq!(mock.total_calls(), 0);
        assert_eq!(engine.view().phase, SyncPhase::Idle);
    }
}
