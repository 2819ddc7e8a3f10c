//! Id-based diff and merge of two listings of the same subject.
//!
//! Identity is the file id alone: reordering, renames, and metadata edits
//! on the server never count as additions or removals.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Materials;

/// Ids that appeared or disappeared between two listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialsDiff {
    /// Ids present in the new listing but not in the old one (per category).
    pub added: BTreeSet<String>,
    /// Ids present in the old listing but not in the new one (per category).
    pub removed: BTreeSet<String>,
}

impl MaterialsDiff {
    /// Whether nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Result of merging a fresh listing into a cached one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The listing to persist.
    pub merged: Materials,
    /// What changed.
    pub diff: MaterialsDiff,
}

/// Merge `new` into `old`.
///
/// For every category in either listing, ids are compared by set
/// difference. A category with files in `new` is replaced wholesale by the
/// new list; a category with no files in `new` is dropped from the result.
pub fn merge(old: &Materials, new: &Materials) -> MergeOutcome {
    let mut merged = old.clone();
    let mut diff = MaterialsDiff::default();

    let categories: BTreeSet<&str> = old.categories().chain(new.categories()).collect();

    for category in categories {
        let old_files = old.category(category).unwrap_or_default();
        let new_files = new.category(category).unwrap_or_default();

        let old_ids: BTreeSet<&str> = old_files.iter().map(|f| f.id.as_str()).collect();
        let new_ids: BTreeSet<&str> = new_files.iter().map(|f| f.id.as_str()).collect();

        diff.removed
            .extend(old_ids.difference(&new_ids).map(|id| id.to_string()));
        diff.added
            .extend(new_ids.difference(&old_ids).map(|id| id.to_string()));

        if new_files.is_empty() {
            merged.remove(category);
        } else {
            merged.insert(category, new_files.to_vec());
        }
    }

    MergeOutcome { merged, diff }
}
