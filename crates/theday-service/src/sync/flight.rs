//! Per-subject flight records backing the single-flight guarantee.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// State of the latest fetch of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    /// Never fetched by this engine.
    Idle,
    /// A fetch is outstanding.
    Fetching,
    /// The last fetch settled.
    Done,
    /// The last fetch failed.
    Failed,
    /// The last fetch was superseded or cancelled.
    Aborted,
}

#[derive(Debug)]
struct Flight {
    generation: u64,
    status: FlightStatus,
    cancel: CancellationToken,
}

/// Permission to run one fetch.
#[derive(Debug)]
pub(crate) struct Ticket {
    pub generation: u64,
    pub cancel: CancellationToken,
}

/// Flight records keyed by subject.
///
/// Each `begin` bumps the generation; only the holder of the current
/// generation may publish to the view.
#[derive(Debug, Default)]
pub(crate) struct FlightTable {
    generation: u64,
    flights: HashMap<String, Flight>,
}

impl FlightTable {
    /// Start a fetch of `subject`, superseding fetches of any other subject.
    ///
    /// Returns `None` when `subject` already has a fetch outstanding.
    pub fn begin(&mut self, subject: &str) -> Option<Ticket> {
        if self.status(subject) == FlightStatus::Fetching {
            return None;
        }

        for (other, flight) in &mut self.flights {
            if flight.status == FlightStatus::Fetching {
                debug!(subject = %other, superseded_by = subject, "Cancelling superseded fetch");
                flight.cancel.cancel();
                flight.status = FlightStatus::Aborted;
            }
        }

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.flights.insert(
            subject.to_string(),
            Flight {
                generation: self.generation,
                status: FlightStatus::Fetching,
                cancel: cancel.clone(),
            },
        );
        Some(Ticket {
            generation: self.generation,
            cancel,
        })
    }

    /// Whether `generation` still owns the view.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Record how the fetch with `generation` ended.
    pub fn finish(&mut self, subject: &str, generation: u64, status: FlightStatus) {
        if let Some(flight) = self.flights.get_mut(subject) {
            if flight.generation == generation {
                flight.status = status;
            }
        }
    }

    /// Cancel the outstanding fetch, if any, and revoke its generation.
    ///
    /// Returns the subject whose fetch was cancelled.
    pub fn abort_current(&mut self) -> Option<String> {
        let (subject, flight) = self
            .flights
            .iter_mut()
            .find(|(_, flight)| flight.status == FlightStatus::Fetching)?;
        flight.cancel.cancel();
        flight.status = FlightStatus::Aborted;
        let subject = subject.clone();
        self.generation += 1;
        Some(subject)
    }

    /// Status of the latest fetch of `subject`.
    pub fn status(&self, subject: &str) -> FlightStatus {
        self.flights
            .get(subject)
            .map_or(FlightStatus::Idle, |flight| flight.status)
    }
}
