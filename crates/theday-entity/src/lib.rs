//! # theday-entity
//!
//! Domain entity models for TheDay. Every struct in this crate is a value
//! object exchanged with the remote materials service or persisted in the
//! client-side key-value store. All entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod file;
pub mod folder;
pub mod materials;
pub mod transcript;

pub use file::{FileEntity, FileKind};
pub use folder::{FolderNode, FolderStructure};
pub use materials::{Materials, MaterialsDiff, MergeOutcome, merge};
pub use transcript::{ClassEntry, SemesterSelection, Subject, Transcript};
