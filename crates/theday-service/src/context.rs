//! Session context carrying the injected collaborators of one client session.

use std::sync::Arc;

use theday_cache::{ClientState, StoreManager, SubjectCache};
use theday_core::config::AppConfig;
use theday_core::traits::clock::Clock;
use theday_remote::RemoteMaterialsClient;

/// Dependencies shared by every engine of a session.
///
/// Built once at bootstrap and cloned into each engine, so nothing in the
/// service layer reaches for ambient globals.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Backing key-value store.
    pub store: Arc<StoreManager>,
    /// Typed view over the persisted session keys.
    pub state: ClientState,
    /// Remote materials service.
    pub remote: Arc<dyn RemoteMaterialsClient>,
    /// Time source for cache expiry.
    pub clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<StoreManager>,
        remote: Arc<dyn RemoteMaterialsClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            state: ClientState::new(Arc::clone(&store)),
            store,
            remote,
            clock,
        }
    }

    /// Subject cache scoped to `class_name`.
    pub fn subject_cache(&self, class_name: &str) -> SubjectCache {
        SubjectCache::new(Arc::clone(&self.store), class_name)
    }
}
