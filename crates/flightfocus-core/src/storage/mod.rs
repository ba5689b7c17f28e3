mod config;
mod counters;
pub mod history;
mod memory;
mod sqlite;

pub use config::{Config, DefaultsConfig, HistoryConfig, MessagesConfig, RewardsConfig, SourceKind};
pub use counters::AggregateCounters;
pub use history::HistoryRecord;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::PersistenceError;

/// Keys shared with the mobile app's storage layout.
pub mod keys {
    pub const TOTAL_FOCUS_TIME: &str = "totalFocusTime";
    pub const BUSINESS_FLIGHTS: &str = "businessFlights";
    pub const FLIGHT_HISTORY: &str = "flightHistory";
    pub const HAS_LAUNCHED: &str = "hasLaunched";
}

/// String key-value persistence.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Write several keys. Backends that support it do so atomically.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        (**self).set_many(entries)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `FLIGHTFOCUS_DATA_DIR` wins if set. Otherwise `~/.config/flightfocus`, or
/// `~/.config/flightfocus-dev` when `FLIGHTFOCUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FLIGHTFOCUS_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FLIGHTFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("flightfocus-dev")
            } else {
                base_dir.join("flightfocus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
