use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{keys, SessionStore};
use crate::error::PersistenceError;

pub const DEFAULT_BUSINESS_CREDITS: u32 = 5;

/// Durable totals that are not derivable from the (capped) history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounters {
    pub total_focus_minutes: u64,
    pub business_credits: u32,
    pub has_onboarded: bool,
}

impl Default for AggregateCounters {
    fn default() -> Self {
        Self::fresh(DEFAULT_BUSINESS_CREDITS)
    }
}

impl AggregateCounters {
    /// Counters for a new installation.
    pub fn fresh(initial_business_credits: u32) -> Self {
        Self {
            total_focus_minutes: 0,
            business_credits: initial_business_credits,
            has_onboarded: false,
        }
    }

    /// Strict load. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns an error if the store fails or a counter is not a valid integer.
    pub fn load<S: SessionStore + ?Sized>(
        store: &S,
        initial_business_credits: u32,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            total_focus_minutes: read_number(store, keys::TOTAL_FOCUS_TIME)?.unwrap_or(0),
            business_credits: read_number(store, keys::BUSINESS_FLIGHTS)?
                .unwrap_or(initial_business_credits),
            has_onboarded: read_flag(store, keys::HAS_LAUNCHED)?,
        })
    }

    /// Load key by key, falling back to the default for anything unreadable.
    pub fn load_or_default<S: SessionStore + ?Sized>(store: &S, initial_business_credits: u32) -> Self {
        let fresh = Self::fresh(initial_business_credits);
        Self {
            total_focus_minutes: lenient(read_number(store, keys::TOTAL_FOCUS_TIME), fresh.total_focus_minutes),
            business_credits: lenient(read_number(store, keys::BUSINESS_FLIGHTS), fresh.business_credits),
            has_onboarded: read_flag(store, keys::HAS_LAUNCHED).unwrap_or_else(|e| {
                warn!(error = %e, "could not read onboarding flag");
                false
            }),
        }
    }

    /// Key/value pairs for the numeric counters, ready for `set_many`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::TOTAL_FOCUS_TIME, self.total_focus_minutes.to_string()),
            (keys::BUSINESS_FLIGHTS, self.business_credits.to_string()),
        ]
    }
}

fn read_number<T, S>(store: &S, key: &str) -> Result<Option<T>, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    S: SessionStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PersistenceError::Corrupt {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
    }
}

/// Presence marks the flag; only an explicit "false" clears it.
fn read_flag<S: SessionStore + ?Sized>(store: &S, key: &str) -> Result<bool, PersistenceError> {
    Ok(store.get(key)?.is_some_and(|v| v.trim() != "false"))
}

fn lenient<T>(result: Result<Option<T>, PersistenceError>, default: T) -> T {
    match result {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            warn!(error = %e, "using default for unreadable counter");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn new_installation_starts_with_five_credits() {
        let store = MemoryStore::new();
        let counters = AggregateCounters::load(&store, DEFAULT_BUSINESS_CREDITS).unwrap();
        assert_eq!(counters, AggregateCounters::default());
        assert_eq!(counters.business_credits, 5);
        assert!(!counters.has_onboarded);
    }

    #[test]
    fn reads_stored_values() {
        let mut store = MemoryStore::new();
        store.set(keys::TOTAL_FOCUS_TIME, "125").unwrap();
        store.set(keys::BUSINESS_FLIGHTS, "0").unwrap();
        store.set(keys::HAS_LAUNCHED, "true").unwrap();
        let counters = AggregateCounters::load(&store, 5).unwrap();
        assert_eq!(counters.total_focus_minutes, 125);
        assert_eq!(counters.business_credits, 0);
        assert!(counters.has_onboarded);
    }

    #[test]
    fn corrupt_counter_is_strict_error_but_lenient_default() {
        let mut store = MemoryStore::new();
        store.set(keys::TOTAL_FOCUS_TIME, "lots").unwrap();
        store.set(keys::BUSINESS_FLIGHTS, "3").unwrap();
        assert!(matches!(
            AggregateCounters::load(&store, 5),
            Err(PersistenceError::Corrupt { .. })
        ));
        let counters = AggregateCounters::load_or_default(&store, 5);
        assert_eq!(counters.total_focus_minutes, 0);
        assert_eq!(counters.business_credits, 3);
    }

    #[test]
    fn negative_credit_count_is_corrupt() {
        let mut store = MemoryStore::new();
        store.set(keys::BUSINESS_FLIGHTS, "-1").unwrap();
        assert!(AggregateCounters::load(&store, 5).is_err());
        assert_eq!(AggregateCounters::load_or_default(&store, 5).business_credits, 5);
    }
}
