//! File domain entities.

pub mod kind;
pub mod model;

pub use kind::FileKind;
pub use model::FileEntity;
