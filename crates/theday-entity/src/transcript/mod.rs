//! Class transcripts: semesters, subjects, and the on-device class registry.

pub mod class;
pub mod default;
pub mod model;
pub mod semester;

pub use class::{ClassEntry, is_valid_class_key};
pub use default::{DEFAULT_CLASS, bundled_default};
pub use model::{Semester, Subject, Transcript, TranscriptName, TranscriptRecord};
pub use semester::SemesterSelection;
