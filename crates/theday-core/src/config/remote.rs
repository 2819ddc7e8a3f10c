//! Remote materials service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP client settings for the materials and transcript endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL the `/api/...` paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for transcript and single-phase materials requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Timeout for the folder-structure phase.
    #[serde(default = "default_folders_timeout")]
    pub folders_timeout_seconds: u64,
    /// Timeout for the file-listing phase.
    #[serde(default = "default_files_timeout")]
    pub files_timeout_seconds: u64,
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl RemoteConfig {
    /// Timeout for transcript and single-phase requests.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Timeout for the folder-structure phase.
    pub fn folders_timeout(&self) -> Duration {
        Duration::from_secs(self.folders_timeout_seconds)
    }

    /// Timeout for the file-listing phase.
    pub fn files_timeout(&self) -> Duration {
        Duration::from_secs(self.files_timeout_seconds)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            folders_timeout_seconds: default_folders_timeout(),
            files_timeout_seconds: default_files_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_folders_timeout() -> u64 {
    10
}

fn default_files_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("theday/", env!("CARGO_PKG_VERSION")).to_string()
}
