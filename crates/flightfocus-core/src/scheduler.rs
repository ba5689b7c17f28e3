//! Periodic attendant-message scheduler.
//!
//! While a session runs, the first message fires `first_delay_secs` after the
//! cadence is armed and then every `interval_secs` counted from that same
//! instant (30 s, 300 s, 600 s, ... with the defaults). Each message stays
//! visible for `display_secs`. A firing while a message is visible replaces it.
//!
//! Pausing disarms everything; resuming re-arms from the resume point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{TimerHandle, TimerQueue};
use crate::messages::{AttendantMessage, MessageRequest, MessageSource};
use crate::session::FlightClass;

/// Timing for attendant messages, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub first_delay_secs: u64,
    pub interval_secs: u64,
    pub display_secs: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            first_delay_secs: 30,
            interval_secs: 300,
            display_secs: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerTimer {
    /// Next message is due.
    Fire,
    /// Hide the visible message.
    Hide,
}

/// Visibility change produced by [`MessageScheduler::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageChange {
    Shown(AttendantMessage),
    Hidden,
}

pub struct MessageScheduler {
    source: Box<dyn MessageSource>,
    cadence: Cadence,
    timers: TimerQueue<SchedulerTimer>,
    /// Virtual second at which the current cadence was armed.
    armed_at: Option<u64>,
    fire_handle: Option<TimerHandle>,
    hide_handle: Option<TimerHandle>,
    visible: Option<AttendantMessage>,
}

impl MessageScheduler {
    pub fn new(source: Box<dyn MessageSource>, cadence: Cadence) -> Self {
        Self {
            source,
            cadence,
            timers: TimerQueue::new(),
            armed_at: None,
            fire_handle: None,
            hide_handle: None,
            visible: None,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn visible(&self) -> Option<&AttendantMessage> {
        self.visible.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Number of timers still outstanding.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Start the cadence from now. Any previous cadence is dropped first.
    pub fn arm(&mut self) {
        self.disarm();
        self.armed_at = Some(self.timers.now_secs());
        self.fire_handle = Some(self.timers.after(self.cadence.first_delay_secs, SchedulerTimer::Fire));
        debug!(first_delay_secs = self.cadence.first_delay_secs, "message cadence armed");
    }

    /// Cancel every pending timer and hide the visible message.
    ///
    /// Returns [`MessageChange::Hidden`] if a message was on screen.
    pub fn disarm(&mut self) -> Option<MessageChange> {
        self.timers.cancel_all();
        self.armed_at = None;
        self.fire_handle = None;
        self.hide_handle = None;
        self.visible.take().map(|_| MessageChange::Hidden)
    }

    /// Move the scheduler clock forward and run whatever came due.
    pub fn advance(
        &mut self,
        secs: u64,
        progress: f64,
        flight_class: FlightClass,
        at: DateTime<Utc>,
    ) -> Vec<MessageChange> {
        let mut changes = Vec::new();
        for (handle, timer) in self.timers.advance(secs) {
            match timer {
                SchedulerTimer::Fire => {
                    if self.fire_handle == Some(handle) {
                        self.fire_handle = None;
                    }
                    let request = MessageRequest {
                        progress,
                        flight_class,
                        at,
                    };
                    changes.push(self.fire(&request));
                    self.schedule_next_fire();
                }
                SchedulerTimer::Hide => {
                    if self.hide_handle == Some(handle) {
                        self.hide_handle = None;
                        if self.visible.take().is_some() {
                            changes.push(MessageChange::Hidden);
                        }
                    }
                }
            }
        }
        changes
    }

    fn fire(&mut self, request: &MessageRequest) -> MessageChange {
        let message = self.source.next_message(request).unwrap_or_else(|e| {
            warn!(error = %e, "message source failed, using fallback");
            AttendantMessage::fallback(request)
        });

        if let Some(old) = self.hide_handle.take() {
            self.timers.cancel(old);
        }
        self.hide_handle = Some(self.timers.after(self.cadence.display_secs, SchedulerTimer::Hide));
        self.visible = Some(message.clone());
        debug!(message = %message.message, "attendant message shown");
        MessageChange::Shown(message)
    }

    /// Next firing on the `interval_secs` grid counted from the arming instant.
    fn schedule_next_fire(&mut self) {
        let Some(origin) = self.armed_at else {
            return;
        };
        let interval = self.cadence.interval_secs.max(1);
        let now = self.timers.now_secs();
        let elapsed = now - origin;
        let next = (elapsed / interval + 1) * interval;
        self.fire_handle = Some(self.timers.after(next - elapsed, SchedulerTimer::Fire));
    }
}
