//! # FlightFocus Core Library
//!
//! This library provides the core logic for FlightFocus, a focus timer framed
//! as a flight between two airports. The CLI binary is a thin driver over the
//! same engine, delivering one tick per second and rendering the events it
//! gets back.
//!
//! ## Architecture
//!
//! - **Session**: A countdown state machine that moves one second per `tick()`
//! - **Messages**: Periodic attendant messages from a pluggable source
//! - **Storage**: Key-value persistence (SQLite or in-memory) and TOML configuration
//! - **Stats**: Totals, averages and day streaks derived from the flight history
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Owns the session, scheduler, history and counters
//! - [`SessionState`]: Countdown state machine
//! - [`MessageScheduler`]: Attendant message cadence
//! - [`SqliteStore`]: Persistent key-value store
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod geo;
pub mod messages;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineSettings, SessionEngine};
pub use error::{ConfigError, CoreError, PersistenceError};
pub use events::Event;
pub use geo::{estimate_flight_minutes, Coordinates, Endpoint};
pub use messages::{AttendantMessage, MessageKind, MessageSource};
pub use scheduler::{Cadence, MessageScheduler};
pub use session::{FlightClass, SessionDescriptor, SessionPhase, SessionState};
pub use stats::DerivedStats;
pub use storage::{AggregateCounters, Config, HistoryRecord, MemoryStore, SessionStore, SqliteStore};
