//! Transcript session and subject sync configuration.

use serde::{Deserialize, Serialize};

/// One week in milliseconds.
pub const WEEK_MS: i64 = 604_800_000;

/// Transcript resolution and cache-expiry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Age after which cached transcripts are purged, in milliseconds.
    #[serde(default = "default_expiry_ms")]
    pub expiry_ms: i64,
    /// Route the user is sent to when a class cannot be resolved.
    #[serde(default = "default_route")]
    pub default_route: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            expiry_ms: default_expiry_ms(),
            default_route: default_route(),
        }
    }
}

/// Subject sync settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Subject abbreviations synced with the folders-then-files protocol.
    #[serde(default)]
    pub split_subjects: Vec<String>,
}

impl SyncConfig {
    /// Whether `subject` uses the two-phase protocol.
    pub fn uses_split(&self, subject: &str) -> bool {
        self.split_subjects
            .iter()
            .any(|s| s.eq_ignore_ascii_case(subject))
    }
}

fn default_expiry_ms() -> i64 {
    WEEK_MS
}

fn default_route() -> String {
    "/?q=default".to_string()
}
