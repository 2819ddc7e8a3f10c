//! Semester preferences.

pub mod service;

pub use service::{CustomSemester, DEFAULT_CUSTOM_NAME, PreferencesService, SemesterView};
