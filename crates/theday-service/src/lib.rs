//! # theday-service
//!
//! Session services for TheDay. Each engine orchestrates the persisted
//! client state, the subject caches, and the remote materials service to
//! implement one part of the portal's client-side behavior.
//!
//! Engines follow constructor injection: every dependency arrives through
//! a [`SessionContext`] built at bootstrap.

pub mod context;
pub mod preferences;
pub mod sync;
pub mod transcript;

pub use context::SessionContext;
pub use preferences::{CustomSemester, PreferencesService, SemesterView};
pub use sync::{FlightStatus, SubjectSyncEngine, SubjectView, SyncOutcome, SyncPhase, SyncProtocol};
pub use transcript::{Resolution, SweepReport, TranscriptSessionEngine, TranscriptSource};
