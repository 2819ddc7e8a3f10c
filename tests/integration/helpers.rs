//! Shared test helpers for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use theday_cache::StoreManager;
use theday_cache::file::FileStore;
use theday_core::config::AppConfig;
use theday_core::traits::clock::ManualClock;
use theday_entity::file::FileEntity;
use theday_entity::materials::Materials;
use theday_entity::transcript::{Semester, Subject, TranscriptRecord};
use theday_remote::mock::MockMaterialsClient;
use theday_service::SessionContext;

/// A 24-hex-char class key.
pub const CLASS_KEY: &str = "deadbeefdeadbeefdeadbeef";

/// Epoch used as "now" by every test clock.
pub const NOW: i64 = 1_700_000_000_000;

/// Test session backed by a file store in a temporary directory.
pub struct TestApp {
    /// Session collaborators
    pub ctx: SessionContext,
    /// Scripted remote
    pub mock: Arc<MockMaterialsClient>,
    /// Controllable clock
    pub clock: Arc<ManualClock>,
    /// Store document path
    pub store_path: PathBuf,
    /// Keeps the directory alive
    dir: Arc<TempDir>,
}

impl TestApp {
    /// Create a fresh session.
    pub async fn new() -> Self {
        let dir = Arc::new(tempfile::tempdir().unwrap());
        Self::open(dir, 5 * 1024 * 1024).await
    }

    /// Create a fresh session whose store holds at most `quota_bytes`.
    pub async fn with_quota(quota_bytes: u64) -> Self {
        let dir = Arc::new(tempfile::tempdir().unwrap());
        Self::open(dir, quota_bytes).await
    }

    /// Open a second session over the same store document, as a new
    /// process on the same device would.
    pub async fn reopen(&self) -> Self {
        Self::open(Arc::clone(&self.dir), 5 * 1024 * 1024).await
    }

    async fn open(dir: Arc<TempDir>, quota_bytes: u64) -> Self {
        let store_path = dir.path().join("theday-store.json");
        let store = FileStore::open_at(&store_path, quota_bytes).await.unwrap();
        let store = Arc::new(StoreManager::from_provider(Arc::new(store)));
        let mock = Arc::new(MockMaterialsClient::new());
        let clock = Arc::new(ManualClock::at(NOW));
        let ctx = SessionContext::new(
            Arc::new(AppConfig::default()),
            store,
            mock.clone(),
            clock.clone(),
        );
        Self {
            ctx,
            mock,
            clock,
            store_path,
            dir,
        }
    }

    /// Raw bytes of the store document.
    pub async fn store_bytes(&self) -> Vec<u8> {
        tokio::fs::read(&self.store_path).await.unwrap_or_default()
    }
}

/// A listing with one category of bare files.
pub fn listing(category: &str, ids: &[&str]) -> Materials {
    Materials::new().with_category(
        category,
        ids.iter()
            .map(|id| FileEntity::new(*id, format!("{id}.pdf")).with_mime_type("application/pdf"))
            .collect(),
    )
}

/// A one-semester transcript for `class`.
pub fn transcript_record(class: &str) -> TranscriptRecord {
    TranscriptRecord {
        id: CLASS_KEY.to_string(),
        class: class.to_string(),
        data: vec![Semester {
            index: 3,
            subjects: vec![
                Subject::new("Data Structures", "DS"),
                Subject::new("Linear Algebra", "LA"),
            ],
        }],
    }
}
