//! Scripted in-process client for tests.
//!
//! Responses are queued per endpoint and subject. Once a queue is drained
//! its last response is replayed, so a subject can be fetched repeatedly.
//! Fetches of a held subject park until [`MockMaterialsClient::release`] is
//! called, which lets tests interleave concurrent syncs deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use theday_core::error::AppError;
use theday_core::result::AppResult;
use theday_entity::folder::FolderStructure;
use theday_entity::materials::Materials;
use theday_entity::transcript::{TranscriptName, TranscriptRecord};

use crate::client::RemoteMaterialsClient;
use crate::dto::{FilesListing, FolderListing};

/// Queued answers of one endpoint for one subject.
///
/// Once drained, the last answer served is replayed.
#[derive(Debug)]
struct ScriptQueue<T> {
    pending: VecDeque<AppResult<T>>,
    replay: Option<AppResult<T>>,
}

impl<T> Default for ScriptQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            replay: None,
        }
    }
}

impl<T: Clone> ScriptQueue<T> {
    fn push(&mut self, response: AppResult<T>) {
        self.pending.push_back(response);
    }

    fn next(&mut self) -> Option<AppResult<T>> {
        match self.pending.pop_front() {
            Some(response) => {
                self.replay = Some(response.clone());
                Some(response)
            }
            None => self.replay.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    materials: HashMap<String, ScriptQueue<Materials>>,
    folders: HashMap<String, ScriptQueue<FolderListing>>,
    files: HashMap<String, ScriptQueue<FilesListing>>,
    transcripts: HashMap<String, AppResult<TranscriptRecord>>,
    transcript_names: HashMap<String, AppResult<TranscriptName>>,
    calls: HashMap<String, usize>,
    last_folders_sent: Option<FolderStructure>,
    gates: HashMap<String, Arc<Notify>>,
}

/// In-memory [`RemoteMaterialsClient`] with scripted answers.
#[derive(Debug, Default)]
pub struct MockMaterialsClient {
    script: Mutex<Script>,
}

impl MockMaterialsClient {
    /// Create a client with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue an answer for `GET /api/subjects/{subject}`.
    pub fn push_materials(&self, subject: &str, response: AppResult<Materials>) {
        self.lock()
            .materials
            .entry(subject.to_string())
            .or_default()
            .push(response);
    }

    /// Queue an answer for `GET /api/subjects/folders/{subject}`.
    pub fn push_folders(&self, subject: &str, response: AppResult<FolderListing>) {
        self.lock()
            .folders
            .entry(subject.to_string())
            .or_default()
            .push(response);
    }

    /// Queue an answer for `POST /api/subjects/files/{subject}`.
    pub fn push_files(&self, subject: &str, response: AppResult<FilesListing>) {
        self.lock()
            .files
            .entry(subject.to_string())
            .or_default()
            .push(response);
    }

    /// Answer for `GET /api/getTranscript?className={class_id}`.
    pub fn set_transcript(&self, class_id: &str, response: AppResult<TranscriptRecord>) {
        self.lock()
            .transcripts
            .insert(class_id.to_string(), response);
    }

    /// Answer for `GET /api/getTranscriptName?className={class_id}`.
    pub fn set_transcript_name(&self, class_id: &str, response: AppResult<TranscriptName>) {
        self.lock()
            .transcript_names
            .insert(class_id.to_string(), response);
    }

    /// Park every subject fetch for `subject` until released.
    pub fn hold(&self, subject: &str) {
        self.lock()
            .gates
            .insert(subject.to_string(), Arc::new(Notify::new()));
    }

    /// Let parked and future fetches for `subject` proceed.
    pub fn release(&self, subject: &str) {
        if let Some(gate) = self.lock().gates.remove(subject) {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    /// Number of calls made, keyed as `"<endpoint>:<argument>"`.
    ///
    /// Endpoints are `materials`, `folders`, `files`, `transcript` and
    /// `transcriptName`.
    pub fn calls(&self, key: &str) -> usize {
        self.lock().calls.get(key).copied().unwrap_or(0)
    }

    /// Total calls across every endpoint.
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Folder structure sent with the most recent files request.
    pub fn last_folders_sent(&self) -> Option<FolderStructure> {
        self.lock().last_folders_sent.clone()
    }

    fn record(&self, endpoint: &str, argument: &str) {
        *self
            .lock()
            .calls
            .entry(format!("{endpoint}:{argument}"))
            .or_insert(0) += 1;
    }

    async fn wait_gate(&self, subject: &str) {
        let gate = self.lock().gates.get(subject).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

fn next_scripted<T: Clone>(
    queues: &mut HashMap<String, ScriptQueue<T>>,
    endpoint: &str,
    subject: &str,
) -> AppResult<T> {
    queues
        .get_mut(subject)
        .and_then(ScriptQueue::next)
        .unwrap_or_else(|| {
            Err(AppError::external_service(format!(
                "{endpoint} failed with status 404 Not Found: no script for '{subject}'"
            )))
        })
}

#[async_trait]
impl RemoteMaterialsClient for MockMaterialsClient {
    async fn fetch_transcript(&self, class_id: &str) -> AppResult<TranscriptRecord> {
        self.record("transcript", class_id);
        self.lock()
            .transcripts
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(AppError::external_service(
                    "getTranscript failed with status 404 Not Found",
                ))
            })
    }

    async fn fetch_transcript_name(&self, class_id: &str) -> AppResult<TranscriptName> {
        self.record("transcriptName", class_id);
        self.lock()
            .transcript_names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(AppError::external_service(
                    "getTranscriptName failed with status 404 Not Found",
                ))
            })
    }

    async fn fetch_materials(&self, subject: &str) -> AppResult<Materials> {
        self.record("materials", subject);
        self.wait_gate(subject).await;
        next_scripted(&mut self.lock().materials, "subjects", subject)
    }

    async fn fetch_folders(&self, subject: &str) -> AppResult<FolderListing> {
        self.record("folders", subject);
        self.wait_gate(subject).await;
        next_scripted(&mut self.lock().folders, "subjects/folders", subject)
    }

    async fn fetch_files(
        &self,
        subject: &str,
        folders: Option<&FolderStructure>,
    ) -> AppResult<FilesListing> {
        self.record("files", subject);
        self.lock().last_folders_sent = folders.cloned();
        self.wait_gate(subject).await;
        next_scripted(&mut self.lock().files, "subjects/files", subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theday_entity::file::FileEntity;

    fn listing(ids: &[&str]) -> Materials {
        Materials::new().with_category(
            "Lectures",
            ids.iter().map(|id| FileEntity::new(*id, *id)).collect(),
        )
    }

    #[tokio::test]
    async fn test_drained_queue_replays_last_response() {
        let mock = MockMaterialsClient::new();
        mock.push_materials("DS", Ok(listing(&["a"])));
        mock.push_materials("DS", Ok(listing(&["a", "b"])));

        assert_eq!(mock.fetch_materials("DS").await.unwrap().total_files(), 1);
        assert_eq!(mock.fetch_materials("DS").await.unwrap().total_files(), 2);
        assert_eq!(mock.fetch_materials("DS").await.unwrap().total_files(), 2);

        mock.push_materials("DS", Ok(listing(&["c"])));
        let replaced = mock.fetch_materials("DS").await.unwrap();
        assert_eq!(replaced, listing(&["c"]));
        assert_eq!(mock.calls("materials:DS"), 4);
    }

    #[tokio::test]
    async fn test_unscripted_subject_fails() {
        let mock = MockMaterialsClient::new();
        assert!(mock.fetch_materials("OS").await.is_err());
        assert!(mock.fetch_transcript("abc").await.is_err());
        assert_eq!(mock.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_hold_parks_until_release() {
        let mock = Arc::new(MockMaterialsClient::new());
        mock.push_materials("DS", Ok(listing(&["a"])));
        mock.hold("DS");

        let task = {
            let mock = Arc::clone(&mock);
            tokio::spawn(async move { mock.fetch_materials("DS").await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        mock.release("DS");
        assert!(task.await.unwrap().is_ok());
    }
}
