mod descriptor;
mod state;

pub use descriptor::{FlightClass, SessionDescriptor};
pub use state::{SessionPhase, SessionState, TickOutcome};
