//! Subject materials sync.

pub mod engine;
pub mod flight;
pub mod view;

pub use engine::{SubjectSyncEngine, SyncOutcome, SyncProtocol};
pub use flight::FlightStatus;
pub use view::{SubjectView, SyncPhase};
