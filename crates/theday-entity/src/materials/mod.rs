//! Categorized file listings of a subject.

pub mod diff;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::file::FileEntity;

pub use diff::{MaterialsDiff, MergeOutcome, merge};

/// Category name → ordered list of files.
///
/// Category names are free-form and come from remote folder names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Materials(BTreeMap<String, Vec<FileEntity>>);

impl Materials {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style category insertion.
    pub fn with_category(mut self, category: impl Into<String>, files: Vec<FileEntity>) -> Self {
        self.0.insert(category.into(), files);
        self
    }

    /// Files of one category.
    pub fn category(&self, name: &str) -> Option<&[FileEntity]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Replace a category's files.
    pub fn insert(&mut self, category: impl Into<String>, files: Vec<FileEntity>) {
        self.0.insert(category.into(), files);
    }

    /// Drop a category.
    pub fn remove(&mut self, category: &str) -> Option<Vec<FileEntity>> {
        self.0.remove(category)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate `(category, files)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileEntity])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of files.
    pub fn total_files(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no categories at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove categories with no files.
    pub fn prune_empty(&mut self) {
        self.0.retain(|_, files| !files.is_empty());
    }
}

impl FromIterator<(String, Vec<FileEntity>)> for Materials {
    fn from_iter<I: IntoIterator<Item = (String, Vec<FileEntity>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
