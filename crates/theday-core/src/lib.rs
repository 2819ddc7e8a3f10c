//! # theday-core
//!
//! Core crate for TheDay. Contains the key-value store and clock traits,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TheDay crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
