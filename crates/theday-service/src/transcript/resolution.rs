//! Results of transcript resolution and the expiry sweep.

use std::fmt;

use serde::Serialize;

use theday_entity::transcript::Transcript;

/// Where a resolved transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    /// The built-in default transcript was requested or is the only option.
    Bundled,
    /// The per-class cache.
    Cache,
    /// A fresh fetch from the remote service.
    Remote,
    /// The remote fetch failed; the bundled default stands in.
    Fallback,
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bundled => "bundled",
            Self::Cache => "cache",
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// The active transcript after resolving a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Transcript to show.
    pub transcript: Transcript,
    /// Active class name after resolution.
    pub class_name: String,
    /// Where the transcript came from.
    pub source: TranscriptSource,
    /// Route the user must be sent to, set only by the fallback path.
    pub redirect: Option<String>,
}

impl Resolution {
    /// Whether resolution degraded to the bundled default after a failure.
    pub fn is_fallback(&self) -> bool {
        self.source == TranscriptSource::Fallback
    }
}

/// What the weekly expiry sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// No timestamp existed; one was recorded.
    pub first_run: bool,
    /// The caches were older than the expiry and were purged.
    pub expired: bool,
    /// Age of the caches when the sweep ran, in milliseconds.
    pub age_ms: Option<i64>,
    /// Classes whose transcript and subject caches were purged.
    pub purged_classes: Vec<String>,
    /// Subject cache entries removed.
    pub purged_subjects: u64,
}
