//! Flat folder structure of a subject, keyed by folder id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One folder in a subject's remote folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Folder id.
    pub id: String,
    /// Folder name; top-level folder names become category names.
    pub name: String,
    /// Parent folder id (`None` for the subject root).
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Folder id → folder node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderStructure(BTreeMap<String, FolderNode>);

impl FolderStructure {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a folder, keyed by its id.
    pub fn insert(&mut self, node: FolderNode) {
        self.0.insert(node.id.clone(), node);
    }

    /// Look up a folder by id.
    pub fn get(&self, id: &str) -> Option<&FolderNode> {
        self.0.get(id)
    }

    /// Number of folders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the structure has no folders.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate folders in id order.
    pub fn iter(&self) -> impl Iterator<Item = &FolderNode> {
        self.0.values()
    }

    /// Names of the category folders, sorted.
    ///
    /// Categories are the folders whose parent is not itself a listed folder
    /// (the direct children of the subject root).
    pub fn category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .values()
            .filter(|node| match &node.parent_id {
                Some(parent) => !self.0.contains_key(parent),
                None => true,
            })
            .map(|node| node.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Resolve the category name a folder belongs to by walking up its parents.
    pub fn category_of(&self, folder_id: &str) -> Option<&str> {
        let mut current = self.0.get(folder_id)?;
        // Bounded walk guards against cyclic parent links in bad payloads.
        for _ in 0..self.0.len() {
            match current.parent_id.as_deref().and_then(|p| self.0.get(p)) {
                Some(parent) => current = parent,
                None => return Some(current.name.as_str()),
            }
        }
        None
    }
}

impl FromIterator<FolderNode> for FolderStructure {
    fn from_iter<I: IntoIterator<Item = FolderNode>>(iter: I) -> Self {
        let mut structure = Self::new();
        for node in iter {
            structure.insert(node);
        }
        structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, parent: Option<&str>) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
        }
    }

    fn sample() -> FolderStructure {
        [
            node("l1", "Lecture 1", Some("root")),
            node("s1", "Section 1", Some("root")),
            node("l1-extra", "Extra", Some("l1")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_category_names_are_top_level_folders() {
        assert_eq!(sample().category_names(), vec!["Lecture 1", "Section 1"]);
    }

    #[test]
    fn test_category_of_nested_folder() {
        let structure = sample();
        assert_eq!(structure.category_of("l1-extra"), Some("Lecture 1"));
        assert_eq!(structure.category_of("s1"), Some("Section 1"));
        assert_eq!(structure.category_of("missing"), None);
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let structure: FolderStructure =
            [node("a", "A", Some("b")), node("b", "B", Some("a"))].into_iter().collect();
        assert_eq!(structure.category_of("a"), None);
    }

    #[test]
    fn test_wire_shape() {
        let json = r#"{"f1": {"id": "f1", "name": "Lecture 1", "parentId": "root"}}"#;
        let structure: FolderStructure = serde_json::from_str(json).unwrap();
        assert_eq!(structure.get("f1").map(|n| n.name.as_str()), Some("Lecture 1"));
    }
}
