//! Statistics derived from flight history and the running counters.
//!
//! Nothing here is stored; every figure is recomputed from the engine's
//! in-memory history on request.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::storage::{AggregateCounters, HistoryRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total_flights: u32,
    /// `total_focus_minutes / total_flights`, rounded half up.
    pub average_session_minutes: u64,
    pub longest_session_minutes: u32,
    pub current_streak_days: u32,
    pub total_focus_minutes: u64,
    pub business_credits: u32,
}

impl DerivedStats {
    /// Compute stats for `today`, mapping completion times into `tz`.
    pub fn compute<Tz: TimeZone>(
        history: &[HistoryRecord],
        counters: &AggregateCounters,
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let total_flights = history.len() as u32;
        Self {
            total_flights,
            average_session_minutes: average_minutes(counters.total_focus_minutes, total_flights),
            longest_session_minutes: history.iter().map(|r| r.duration_minutes).max().unwrap_or(0),
            current_streak_days: current_streak(history, today, tz),
            total_focus_minutes: counters.total_focus_minutes,
            business_credits: counters.business_credits,
        }
    }
}

/// Integer mean with halves rounded up. Zero flights averages to zero.
pub fn average_minutes(total_minutes: u64, flights: u32) -> u64 {
    if flights == 0 {
        return 0;
    }
    let n = u128::from(flights);
    let mean = (2 * u128::from(total_minutes) + n) / (2 * n);
    // Never exceeds `total_minutes`.
    u64::try_from(mean).unwrap_or(u64::MAX)
}

/// Consecutive days with at least one completion, counted back from `today`.
///
/// A streak whose latest day is yesterday still counts. Completions dated
/// after `today` end the walk.
pub fn current_streak<Tz: TimeZone>(history: &[HistoryRecord], today: NaiveDate, tz: &Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = history
        .iter()
        .map(|r| r.completed_at.with_timezone(tz).date_naive())
        .collect();

    let mut streak = 0;
    let mut cursor = today;
    for day in days.into_iter().rev() {
        match (cursor - day).num_days() {
            0 | 1 => {
                streak += 1;
                cursor = day;
            }
            _ => break,
        }
    }
    streak
}
