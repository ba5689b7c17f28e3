//! Countdown state machine for a single session.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Completed
//!   ^___________________ reset ___________________|
//! ```
//!
//! The machine has no notion of wall time; it moves one second per `tick()`.
//! Progress and position are computed from `remaining_secs` on every read.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::descriptor::SessionDescriptor;
use crate::error::{CoreError, Result};
use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// What a single `tick()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Ignored,
    /// One second elapsed, still running.
    Advanced,
    /// The countdown reached zero on this tick.
    Completed,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    descriptor: SessionDescriptor,
    phase: SessionPhase,
    remaining_secs: u32,
    /// Set on the first start; callers label the next action "Resume" instead of "Start".
    has_started: bool,
}

impl SessionState {
    /// Create an idle session.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSession`] if the descriptor does not validate.
    pub fn new(descriptor: SessionDescriptor) -> Result<Self> {
        descriptor.validate()?;
        let remaining_secs = descriptor.duration_secs;
        Ok(Self {
            descriptor,
            phase: SessionPhase::Idle,
            remaining_secs,
            has_started: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.descriptor.duration_secs
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// 0.0 .. 1.0 fraction of the duration elapsed.
    pub fn progress(&self) -> f64 {
        let total = self.descriptor.duration_secs;
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Aircraft position along the route at the current progress.
    pub fn position(&self) -> Coordinates {
        self.descriptor
            .departure
            .coordinates
            .lerp(&self.descriptor.arrival.coordinates, self.progress())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<()> {
        self.require(SessionPhase::Idle, "start")?;
        self.phase = SessionPhase::Running;
        self.has_started = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require(SessionPhase::Running, "pause")?;
        self.phase = SessionPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require(SessionPhase::Paused, "resume")?;
        self.phase = SessionPhase::Running;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.remaining_secs = self.descriptor.duration_secs;
        self.has_started = false;
    }

    /// Advance one second. Only has an effect while running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Running {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.phase = SessionPhase::Completed;
            TickOutcome::Completed
        } else {
            TickOutcome::Advanced
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, expected: SessionPhase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
