//! Reqwest-backed materials client.
//!
//! This adapter owns transport details only: URL construction, per-phase
//! timeouts, HTTP status mapping, and JSON decoding into domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use theday_core::config::remote::RemoteConfig;
use theday_core::error::{AppError, ErrorKind};
use theday_core::result::AppResult;
use theday_entity::folder::FolderStructure;
use theday_entity::materials::Materials;
use theday_entity::transcript::{TranscriptName, TranscriptRecord};

use crate::client::RemoteMaterialsClient;
use crate::dto::{
    FilesListing, FilesRequest, FolderListing, TranscriptEnvelope, TranscriptNameEnvelope,
};

/// Longest response excerpt carried in an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// HTTP client for the materials service.
#[derive(Debug, Clone)]
pub struct HttpMaterialsClient {
    client: Client,
    base_url: Url,
    folders_timeout: Duration,
    files_timeout: Duration,
}

impl HttpMaterialsClient {
    /// Build a client from configuration.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid remote base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Remote base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url,
            folders_timeout: config.folders_timeout(),
            files_timeout: config.files_timeout(),
        })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::configuration("Remote base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Endpoint with a `className` query parameter.
    fn class_endpoint(&self, path: &str, class_id: &str) -> AppResult<Url> {
        let mut url = self.endpoint(&["api", path])?;
        url.query_pairs_mut().append_pair("className", class_id);
        Ok(url)
    }

    /// Send a request and decode a successful JSON body.
    async fn send_json<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> AppResult<T> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_transport_error(what, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(what, e))?;

        if !status.is_success() {
            let excerpt: String = String::from_utf8_lossy(&body)
                .chars()
                .take(ERROR_BODY_EXCERPT)
                .collect();
            return Err(AppError::external_service(format!(
                "{what} failed with status {status}: {excerpt}"
            )));
        }

        debug!(what, bytes = body.len(), "Remote response received");
        serde_json::from_slice(&body).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("{what} returned a malformed body: {e}"),
                e,
            )
        })
    }
}

fn map_transport_error(what: &str, error: reqwest::Error) -> AppError {
    let kind = if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::ExternalService
    };
    AppError::with_source(kind, format!("{what} request failed: {error}"), error)
}

#[async_trait]
impl RemoteMaterialsClient for HttpMaterialsClient {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, class_id: &str) -> AppResult<TranscriptRecord> {
        let url = self.class_endpoint("getTranscript", class_id)?;
        let envelope: TranscriptEnvelope = self.send_json("getTranscript", self.client.get(url)).await?;
        Ok(envelope.transcript)
    }

    #[instrument(skip(self))]
    async fn fetch_transcript_name(&self, class_id: &str) -> AppResult<TranscriptName> {
        let url = self.class_endpoint("getTranscriptName", class_id)?;
        let envelope: TranscriptNameEnvelope = self
            .send_json("getTranscriptName", self.client.get(url))
            .await?;
        Ok(envelope.transcript_name)
    }

    #[instrument(skip(self))]
    async fn fetch_materials(&self, subject: &str) -> AppResult<Materials> {
        let url = self.endpoint(&["api", "subjects", subject])?;
        self.send_json("subjects", self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn fetch_folders(&self, subject: &str) -> AppResult<FolderListing> {
        let url = self.endpoint(&["api", "subjects", "folders", subject])?;
        let request = self.client.get(url).timeout(self.folders_timeout);
        self.send_json("subjects/folders", request).await
    }

    #[instrument(skip(self, folders), fields(with_structure = folders.is_some()))]
    async fn fetch_files(
        &self,
        subject: &str,
        folders: Option<&FolderStructure>,
    ) -> AppResult<FilesListing> {
        let url = self.endpoint(&["api", "subjects", "files", subject])?;
        let request = self
            .client
            .post(url)
            .timeout(self.files_timeout)
            .json(&FilesRequest {
                folder_structure: folders,
            });
        self.send_json("subjects/files", request).await
    }
}
