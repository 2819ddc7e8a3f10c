//! The transcript bundled with the application.

use std::sync::OnceLock;

use tracing::error;

use super::model::Transcript;

/// Reserved class name and `q` token for the bundled transcript.
pub const DEFAULT_CLASS: &str = "default";

const BUNDLED_JSON: &str = include_str!("../../data/default_transcript.json");

/// The bundled default transcript.
///
/// Parsed once; a malformed bundle degrades to an empty transcript.
pub fn bundled_default() -> &'static Transcript {
    static BUNDLED: OnceLock<Transcript> = OnceLock::new();
    BUNDLED.get_or_init(|| {
        serde_json::from_str(BUNDLED_JSON).unwrap_or_else(|e| {
            error!(error = %e, "Bundled default transcript is malformed");
            Transcript::default()
        })
    })
}
