//! Core traits defined in `theday-core` and implemented by other crates.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::KeyValueStore;
