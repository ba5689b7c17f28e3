use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::messages::AttendantMessage;
use crate::session::SessionPhase;
use crate::storage::HistoryRecord;

/// Every state change in the engine produces an Event.
/// The CLI prints them; a GUI would render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionCreated {
        departure: String,
        arrival: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    SessionStarted {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// The countdown reached zero and the flight was logged.
    SessionCompleted {
        record: HistoryRecord,
        at: DateTime<Utc>,
    },
    MessageShown {
        message: AttendantMessage,
    },
    MessageHidden {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SessionPhase,
        remaining_secs: u32,
        duration_secs: u32,
        progress: f64,
        position: Coordinates,
        has_started: bool,
        message: Option<AttendantMessage>,
        at: DateTime<Utc>,
    },
}
