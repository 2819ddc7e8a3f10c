//! Observable state of the subject being shown.

use std::fmt;

use theday_core::error::AppError;
use theday_entity::folder::FolderStructure;
use theday_entity::materials::Materials;

/// Step of a sync invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Reading the local cache.
    CacheCheck,
    /// Cached materials are on screen.
    CacheHit,
    /// No usable cache; showing the fallback or a loading state.
    CacheMiss,
    /// Waiting on the remote service.
    Fetching,
    /// The folder structure arrived; files are still loading.
    FoldersReady,
    /// Merging the fresh listing into the cache.
    Diffing,
    /// Done; the view reflects the latest listing.
    Settled,
    /// The fetch was superseded or cancelled.
    Aborted,
    /// The fetch failed; whatever was shown stays.
    Failed,
}

impl SyncPhase {
    /// Whether no further transition follows.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Aborted | Self::Failed)
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CacheCheck => "cache-check",
            Self::CacheHit => "cache-hit",
            Self::CacheMiss => "cache-miss",
            Self::Fetching => "fetching",
            Self::FoldersReady => "folders-ready",
            Self::Diffing => "diffing",
            Self::Settled => "settled",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the materials screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectView {
    /// Subject the view belongs to.
    pub subject: Option<String>,
    /// Materials on screen: cached, fallback, or fresh.
    pub data: Option<Materials>,
    /// Category skeleton from the folders phase of a two-phase sync.
    pub folders: Option<FolderStructure>,
    /// Ids added by the latest fetch compared to the previous snapshot.
    pub new_items: Vec<String>,
    /// Nothing to show yet; a spinner is expected.
    pub loading: bool,
    /// A remote fetch is outstanding.
    pub fetching: bool,
    /// Current step.
    pub phase: SyncPhase,
    /// Last sync failure, cleared by the next sync.
    pub error: Option<AppError>,
}

impl SubjectView {
    /// Fresh view for a sync of `subject` that is about to read the cache.
    pub(crate) fn checking(subject: &str) -> Self {
        Self {
            subject: Some(subject.to_string()),
            fetching: true,
            phase: SyncPhase::CacheCheck,
            ..Self::default()
        }
    }

    /// Whether the id is among the newly added items.
    pub fn is_new(&self, id: &str) -> bool {
        self.new_items.iter().any(|item| item == id)
    }
}
