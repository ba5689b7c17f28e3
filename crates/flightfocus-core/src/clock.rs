//! Time sources.
//!
//! The engine never reads the system time directly. Wall-clock timestamps come
//! from a [`Clock`]; delays are counted in whole seconds on a [`TimerQueue`]
//! that only moves when the driver delivers a tick. A session that receives no
//! ticks (paused, idle) therefore has no timers running behind its back.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Wall-clock source.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same instant, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = at;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

/// Handle returned by [`TimerQueue::after`], used to cancel a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<K> {
    id: u64,
    due_secs: u64,
    kind: K,
}

/// Virtual-time delay queue measured in whole seconds.
#[derive(Debug)]
pub struct TimerQueue<K> {
    now_secs: u64,
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            now_secs: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds this queue has been advanced in total.
    pub fn now_secs(&self) -> u64 {
        self.now_secs
    }

    /// Schedule `kind` to fire `delay_secs` from now.
    pub fn after(&mut self, delay_secs: u64, kind: K) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_secs: self.now_secs + delay_secs,
            kind,
        });
        TimerHandle(id)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != handle.0);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.id == handle.0)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move time forward and return every timer that came due, earliest first.
    /// Timers due at the same second fire in scheduling order.
    pub fn advance(&mut self, secs: u64) -> Vec<(TimerHandle, K)> {
        self.now_secs += secs;
        let now = self.now_secs;
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due_secs <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due_secs, p.id));
        due.into_iter().map(|p| (TimerHandle(p.id), p.kind)).collect()
    }
}
