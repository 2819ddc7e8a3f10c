//! Active class and transcript resolution with weekly cache expiry.

use tracing::{debug, info, instrument, warn};

use theday_core::error::AppError;
use theday_core::result::AppResult;
use theday_entity::transcript::{
    ClassEntry, DEFAULT_CLASS, Transcript, bundled_default, is_valid_class_key,
};

use crate::context::SessionContext;

use super::resolution::{Resolution, SweepReport, TranscriptSource};

/// Resolves which class transcript is active for a navigation.
#[derive(Debug, Clone)]
pub struct TranscriptSessionEngine {
    ctx: SessionContext,
}

impl TranscriptSessionEngine {
    /// Creates a new transcript engine.
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Session bootstrap: run the expiry sweep, then resolve `q`.
    pub async fn bootstrap(&self, q: Option<&str>) -> (SweepReport, Resolution) {
        let report = self.sweep().await;
        let resolution = self.resolve(q).await;
        (report, resolution)
    }

    /// Purge transcript and subject caches once they are older than the
    /// configured expiry.
    ///
    /// The registry itself is never pruned; only cached payloads are.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> SweepReport {
        let state = &self.ctx.state;
        let now = self.ctx.clock.now_millis();

        let Some(stored_at) = state.transcript_stored_at().await else {
            state.set_transcript_stored_at(now).await;
            info!(stored_at = now, "Recorded transcript cache timestamp");
            return SweepReport {
                first_run: true,
                ..SweepReport::default()
            };
        };

        let expiry_ms = self.ctx.config.transcript.expiry_ms;
        let age = now.checked_sub(stored_at);
        let mut report = SweepReport {
            age_ms: age,
            ..SweepReport::default()
        };
        match age {
            Some(age) if (expiry_ms.saturating_neg()..=expiry_ms).contains(&age) => {
                debug!(age_ms = age, "Transcript caches are fresh");
                return report;
            }
            Some(age) if age > expiry_ms => {}
            // Unrepresentable or far in the future: the timestamp is corrupt.
            _ => {
                warn!(stored_at, now, "Malformed transcript timestamp, purging caches");
                report.age_ms = None;
            }
        }

        state.set_transcript_stored_at(now).await;
        state.remove_transcript().await;

        let mut classes: Vec<String> = Vec::new();
        for entry in state.classes().await {
            if !classes.contains(&entry.class) {
                classes.push(entry.class);
            }
        }
        for class_name in &classes {
            state.remove_class_transcript(class_name).await;
            report.purged_subjects += state.purge_subject_namespace(class_name).await;
        }
        report.purged_subjects += state.purge_subject_namespace(DEFAULT_CLASS).await;

        info!(
            age_ms = ?report.age_ms,
            classes = classes.len(),
            subjects = report.purged_subjects,
            "Expired transcript caches purged"
        );
        report.expired = true;
        report.purged_classes = classes;
        report
    }

    /// Resolve the transcript for a navigation with class parameter `q`.
    ///
    /// Never fails: an unreachable or unknown class degrades to the bundled
    /// default with a redirect to the default route.
    #[instrument(skip(self))]
    pub async fn resolve(&self, q: Option<&str>) -> Resolution {
        match q.map(str::trim).filter(|q| !q.is_empty()) {
            Some(DEFAULT_CLASS) => self.use_bundled(TranscriptSource::Bundled, None).await,
            Some(class_id) => self.resolve_class_id(class_id).await,
            None => self.resolve_active().await,
        }
    }

    /// Check that `key` names an existing class without switching to it.
    #[instrument(skip(self))]
    pub async fn validate_key(&self, key: &str) -> AppResult<ClassEntry> {
        let key = key.trim();
        if !is_valid_class_key(key) {
            return Err(AppError::validation(format!(
                "'{key}' is not a class key: expected 24 hexadecimal characters"
            )));
        }

        let name = self.ctx.remote.fetch_transcript_name(key).await?;
        if name.class.trim().is_empty() {
            return Err(AppError::not_found(format!("No class has key '{key}'")));
        }
        Ok(ClassEntry::new(name.class, key))
    }

    /// Validate `key`, then make its class the active one.
    pub async fn switch_class(&self, key: &str) -> AppResult<Resolution> {
        let entry = self.validate_key(key).await?;
        info!(class = %entry.class, "Switching class");
        Ok(self.resolve(Some(&entry.id)).await)
    }

    /// Classes unlocked on this device.
    pub async fn registered_classes(&self) -> Vec<ClassEntry> {
        self.ctx.state.classes().await
    }

    /// Name of the active class, if one was ever resolved.
    pub async fn active_class_name(&self) -> Option<String> {
        self.ctx.state.active_class_name().await
    }

    async fn resolve_class_id(&self, class_id: &str) -> Resolution {
        let state = &self.ctx.state;
        if let Some(entry) = state.find_class_by_id(class_id).await {
            if let Some(transcript) = state.class_transcript(&entry.class).await {
                debug!(class = %entry.class, "Using cached class transcript");
                state.set_active_class_name(&entry.class).await;
                return Resolution {
                    transcript,
                    class_name: entry.class,
                    source: TranscriptSource::Cache,
                    redirect: None,
                };
            }
            debug!(class = %entry.class, "Registered class has no cached transcript");
        }
        self.fetch_class(class_id).await
    }

    async fn resolve_active(&self) -> Resolution {
        let state = &self.ctx.state;
        let active = state
            .active_class_name()
            .await
            .filter(|name| name != DEFAULT_CLASS);
        let Some(class_name) = active else {
            return self.use_bundled(TranscriptSource::Bundled, None).await;
        };

        if let Some(transcript) = state.class_transcript(&class_name).await {
            return Resolution {
                transcript,
                class_name,
                source: TranscriptSource::Cache,
                redirect: None,
            };
        }
        if let Some(entry) = state.find_class_by_name(&class_name).await {
            debug!(class = %class_name, "Active class cache was purged; refetching");
            return self.fetch_class(&entry.id).await;
        }

        warn!(class = %class_name, "Active class is neither cached nor registered");
        self.use_bundled(TranscriptSource::Bundled, None).await
    }

    async fn fetch_class(&self, class_id: &str) -> Resolution {
        match self.fetch_and_store(class_id).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(class_id, error = %e, "Transcript fetch failed; falling back to default");
                let route = self.ctx.config.transcript.default_route.clone();
                self.use_bundled(TranscriptSource::Fallback, Some(route))
                    .await
            }
        }
    }

    async fn fetch_and_store(&self, class_id: &str) -> AppResult<Resolution> {
        let record = self.ctx.remote.fetch_transcript(class_id).await?;
        let (class_name, transcript) = record.into_parts();
        if class_name.trim().is_empty() {
            return Err(AppError::validation("Transcript has no class name"));
        }

        let state = &self.ctx.state;
        state.set_class_transcript(&class_name, &transcript).await;
        state.set_transcript(&transcript).await;
        if state
            .register_class(ClassEntry::new(class_name.as_str(), class_id))
            .await
        {
            info!(class = %class_name, "Class registered");
        }
        state.set_active_class_name(&class_name).await;

        Ok(Resolution {
            transcript,
            class_name,
            source: TranscriptSource::Remote,
            redirect: None,
        })
    }

    async fn use_bundled(&self, source: TranscriptSource, redirect: Option<String>) -> Resolution {
        self.ctx.state.set_active_class_name(DEFAULT_CLASS).await;
        Resolution {
            transcript: Transcript::clone(bundled_default()),
            class_name: DEFAULT_CLASS.to_string(),
            source,
            redirect,
        }
    }
}
