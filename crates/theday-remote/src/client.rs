//! Remote materials client trait.

use async_trait::async_trait;

use theday_core::result::AppResult;
use theday_entity::folder::FolderStructure;
use theday_entity::materials::Materials;
use theday_entity::transcript::{TranscriptName, TranscriptRecord};

use crate::dto::{FilesListing, FolderListing};

/// Access to transcripts and subject materials held by the remote service.
///
/// Any non-success answer or undecodable body is an error; callers decide
/// how to degrade.
#[async_trait]
pub trait RemoteMaterialsClient: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the full transcript of a class by its id.
    async fn fetch_transcript(&self, class_id: &str) -> AppResult<TranscriptRecord>;

    /// Fetch only the identity of a class, to validate an access key.
    async fn fetch_transcript_name(&self, class_id: &str) -> AppResult<TranscriptName>;

    /// Fetch a subject's categorized materials in one request.
    async fn fetch_materials(&self, subject: &str) -> AppResult<Materials>;

    /// Fetch only the folder structure of a subject.
    async fn fetch_folders(&self, subject: &str) -> AppResult<FolderListing>;

    /// Fetch every file of a subject.
    ///
    /// Passing the folder structure from [`fetch_folders`](Self::fetch_folders)
    /// lets the server skip rebuilding it.
    async fn fetch_files(
        &self,
        subject: &str,
        folders: Option<&FolderStructure>,
    ) -> AppResult<FilesListing>;
}
