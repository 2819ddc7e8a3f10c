//! # theday-cache
//!
//! Client-side persistence for TheDay. Two [`KeyValueStore`] backends are
//! provided:
//!
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka)
//! - **file**: a single JSON document on disk with a byte quota, mirroring
//!   browser storage semantics
//!
//! On top of the raw store sit the [`SubjectCache`] (per-subject materials
//! with id-based diffing) and [`ClientState`] (typed access to every other
//! persisted key). Both swallow store failures: a broken store degrades to
//! cache misses and dropped writes, never to errors.
//!
//! [`KeyValueStore`]: theday_core::traits::KeyValueStore

#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
pub mod state;
pub mod subject;

pub use provider::StoreManager;
pub use state::ClientState;
pub use subject::{SubjectCache, UpdateResult};
