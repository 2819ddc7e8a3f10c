//! File classification by MIME type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a listed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A folder (category or nested folder).
    Folder,
    /// PDF document.
    Pdf,
    /// Word-processor document.
    Document,
    /// Spreadsheet.
    Spreadsheet,
    /// Slide deck.
    Presentation,
    /// Image.
    Image,
    /// Video.
    Video,
    /// Compressed archive.
    Archive,
    /// External link stored as a named placeholder.
    Link,
    /// Anything else.
    Other,
}

impl FileKind {
    /// Classify a MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/vnd.google-apps.folder" => Self::Folder,
            "application/pdf" => Self::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/vnd.google-apps.document"
            | "text/plain" => Self::Document,
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.google-apps.spreadsheet"
            | "text/csv" => Self::Spreadsheet,
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            | "application/vnd.google-apps.presentation" => Self::Presentation,
            "application/zip"
            | "application/x-zip-compressed"
            | "application/x-rar-compressed"
            | "application/vnd.rar"
            | "application/x-7z-compressed" => Self::Archive,
            "application/vnd.google-apps.shortcut" | "text/uri-list" => Self::Link,
            m if m.starts_with("image/") => Self::Image,
            m if m.starts_with("video/") => Self::Video,
            _ => Self::Other,
        }
    }

    /// Whether this kind is a container rather than a file.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Pdf => "pdf",
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::Image => "image",
            Self::Video => "video",
            Self::Archive => "archive",
            Self::Link => "link",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
