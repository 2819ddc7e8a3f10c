//! Store key builders for every persisted entry.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all TheDay store keys.
const PREFIX: &str = "theday";

/// Escape a free-form key segment so it cannot forge a `:` boundary.
fn segment(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

// ── Class / transcript keys ────────────────────────────────

/// Active class name.
pub fn active_class_name() -> String {
    format!("{PREFIX}:className")
}

/// Registry of classes unlocked on this device.
pub fn class_registry() -> String {
    format!("{PREFIX}:classes")
}

/// Generic active-transcript cache.
pub fn transcript() -> String {
    format!("{PREFIX}:transcript")
}

/// Per-class transcript cache.
pub fn class_transcript(class_name: &str) -> String {
    format!("{PREFIX}:class:{}", segment(class_name))
}

/// Epoch-millisecond timestamp the weekly sweep measures from.
pub fn transcript_stored_at() -> String {
    format!("{PREFIX}:transcriptStoredAt")
}

// ── Semester preference keys ───────────────────────────────

/// Selected semester (`-1` unset, `-2` custom).
pub fn semester() -> String {
    format!("{PREFIX}:semester")
}

/// Abbreviations in the user-curated semester.
pub fn custom_semester_subjects() -> String {
    format!("{PREFIX}:customSemesterSubjects")
}

/// Display name of the user-curated semester.
pub fn custom_semester_name() -> String {
    format!("{PREFIX}:customSemesterName")
}

// ── Subject materials keys ─────────────────────────────────

/// Materials cache of one subject within a class namespace.
pub fn subject_materials(class_name: &str, subject: &str) -> String {
    format!("{}{}", subject_namespace(class_name), segment(subject))
}

/// Prefix shared by every subject cache of a class.
pub fn subject_namespace(class_name: &str) -> String {
    format!("{PREFIX}:subject:{}:", segment(class_name))
}
