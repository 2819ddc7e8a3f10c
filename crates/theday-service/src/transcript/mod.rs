//! Class transcript resolution and the weekly expiry sweep.

pub mod engine;
pub mod resolution;

pub use engine::TranscriptSessionEngine;
pub use resolution::{Resolution, SweepReport, TranscriptSource};
