//! # theday-remote
//!
//! Client side of the materials service contract:
//!
//! - `GET  /api/getTranscript?className={id}`
//! - `GET  /api/getTranscriptName?className={id}`
//! - `GET  /api/subjects/{subject}`
//! - `GET  /api/subjects/folders/{subject}`
//! - `POST /api/subjects/files/{subject}`
//!
//! [`RemoteMaterialsClient`] is the seam the sync engines depend on;
//! [`HttpMaterialsClient`] implements it over reqwest.

pub mod client;
pub mod dto;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::RemoteMaterialsClient;
pub use dto::{FilesListing, FilesMetadata, FolderListing};
pub use http::HttpMaterialsClient;
