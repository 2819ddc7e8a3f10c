//! Folder structure entities returned by the folders phase.

pub mod structure;

pub use structure::{FolderNode, FolderStructure};
