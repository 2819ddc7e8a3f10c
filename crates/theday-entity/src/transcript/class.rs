//! Class registry entries and access-key validation.

use serde::{Deserialize, Serialize};

/// Length of a class access key (a 12-byte object id in hex).
const CLASS_KEY_LEN: usize = 24;

/// A class the user has unlocked on this device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassEntry {
    /// Class name.
    pub class: String,
    /// Class id (access key).
    pub id: String,
}

impl ClassEntry {
    /// Create an entry.
    pub fn new(class: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            id: id.into(),
        }
    }
}

/// Whether `key` is shaped like a class access key (24 hex characters).
pub fn is_valid_class_key(key: &str) -> bool {
    key.len() == CLASS_KEY_LEN && key.bytes().all(|b| b.is_ascii_hexdigit())
}
