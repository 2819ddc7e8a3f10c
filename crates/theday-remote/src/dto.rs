//! Request and response bodies of the materials service.

use serde::{Deserialize, Deserializer, Serialize};

use theday_entity::folder::FolderStructure;
use theday_entity::materials::Materials;
use theday_entity::transcript::{TranscriptName, TranscriptRecord};

/// Body of `GET /api/getTranscript`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TranscriptEnvelope {
    pub transcript: TranscriptRecord,
}

/// Body of `GET /api/getTranscriptName`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptNameEnvelope {
    pub transcript_name: TranscriptName,
}

/// Body of `POST /api/subjects/files/{subject}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_structure: Option<&'a FolderStructure>,
}

/// Result of the folders phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing {
    /// Folder id → folder.
    pub folder_structure: FolderStructure,
    /// Server-side bookkeeping, passed through untouched.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Server-side phase timings, passed through untouched.
    #[serde(default)]
    pub timings: serde_json::Value,
}

/// Summary attached to the files phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesMetadata {
    /// Number of files across all categories.
    #[serde(default)]
    pub total_files: u64,
    /// Number of categories.
    #[serde(default, deserialize_with = "count_or_len")]
    pub categories: u64,
}

/// Result of the files phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListing {
    /// Category name → files.
    pub files_data: Materials,
    /// Summary counts.
    #[serde(default)]
    pub metadata: FilesMetadata,
    /// Server-side phase timings, passed through untouched.
    #[serde(default)]
    pub timings: serde_json::Value,
}

/// Some deployments send the category count, others the category names.
fn count_or_len<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountOrList {
        Count(u64),
        List(Vec<serde_json::Value>),
    }

    Ok(match Option::<CountOrList>::deserialize(deserializer)? {
        Some(CountOrList::Count(n)) => n,
        Some(CountOrList::List(items)) => items.len() as u64,
        None => 0,
    })
}
