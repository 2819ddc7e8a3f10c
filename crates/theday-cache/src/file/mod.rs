//! File-persisted key-value store.

pub mod store;

pub use store::FileStore;
