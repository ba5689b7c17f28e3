//! Session engine: one countdown, its attendant messages and the durable
//! records it leaves behind.
//!
//! The engine has no thread of its own. The driver calls [`SessionEngine::on_tick`]
//! once per second; lifecycle commands are plain method calls. Each call
//! returns the [`Event`]s it produced.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::from_config(store, SystemClock, &config);
//! engine.create_session(descriptor)?;
//! engine.start()?;
//! // Once per second:
//! for event in engine.on_tick()? { /* render */ }
//! ```

use chrono::{Local, TimeZone};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, PersistenceError, Result};
use crate::events::Event;
use crate::messages::{AttendantMessage, MessageSource};
use crate::scheduler::{Cadence, MessageChange, MessageScheduler};
use crate::session::{FlightClass, SessionDescriptor, SessionPhase, SessionState, TickOutcome};
use crate::stats::DerivedStats;
use crate::storage::history::{self, DEFAULT_CAPACITY};
use crate::storage::{keys, AggregateCounters, Config, HistoryRecord, SessionStore};

/// Tunables the engine reads once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub cadence: Cadence,
    pub history_capacity: usize,
    pub initial_business_credits: u32,
    /// Sessions at least this long earn one business credit.
    pub business_reward_threshold_min: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cadence: Cadence::default(),
            history_capacity: DEFAULT_CAPACITY,
            initial_business_credits: 5,
            business_reward_threshold_min: 45,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            cadence: config.cadence(),
            history_capacity: config.history.capacity,
            initial_business_credits: config.rewards.initial_business_credits,
            business_reward_threshold_min: config.rewards.business_reward_threshold_min,
        }
    }
}

pub struct SessionEngine<S: SessionStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    scheduler: MessageScheduler,
    settings: EngineSettings,
    session: Option<SessionState>,
    /// Newest first, capped at `settings.history_capacity`.
    history: Vec<HistoryRecord>,
    counters: AggregateCounters,
    last_completed: Option<HistoryRecord>,
}

impl<S: SessionStore, C: Clock> SessionEngine<S, C> {
    /// Build an engine over `store`, loading history and counters from it.
    ///
    /// Unreadable or corrupt values are logged and replaced by defaults.
    /// A history capacity of zero is raised to one.
    pub fn new(store: S, clock: C, source: Box<dyn MessageSource>, mut settings: EngineSettings) -> Self {
        settings.history_capacity = settings.history_capacity.max(1);
        let counters = AggregateCounters::load_or_default(&store, settings.initial_business_credits);
        let mut history = match store.get(keys::FLIGHT_HISTORY) {
            Ok(Some(raw)) => history::decode_history(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read flight history");
                Vec::new()
            }
        };
        history.truncate(settings.history_capacity);
        debug!(
            flights = history.len(),
            business_credits = counters.business_credits,
            "session engine loaded"
        );

        Self {
            store,
            clock,
            scheduler: MessageScheduler::new(source, settings.cadence),
            settings,
            session: None,
            history,
            counters,
            last_completed: None,
        }
    }

    /// Build an engine with the message source and tunables from `config`.
    pub fn from_config(store: S, clock: C, config: &Config) -> Self {
        Self::new(store, clock, config.message_source(), EngineSettings::from(config))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<SessionPhase> {
        self.session.as_ref().map(SessionState::phase)
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn counters(&self) -> &AggregateCounters {
        &self.counters
    }

    /// Record written by the most recent completion, even if persisting it failed.
    pub fn last_completed(&self) -> Option<&HistoryRecord> {
        self.last_completed.as_ref()
    }

    pub fn visible_message(&self) -> Option<&AttendantMessage> {
        self.scheduler.visible()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of message timers still outstanding.
    pub fn pending_message_timers(&self) -> usize {
        self.scheduler.pending_timers()
    }

    /// Stats with streak days taken in the device's local time zone.
    pub fn stats(&self) -> DerivedStats {
        self.stats_in(&Local)
    }

    pub fn stats_in<Tz: TimeZone>(&self, tz: &Tz) -> DerivedStats {
        let today = self.clock.now().with_timezone(tz).date_naive();
        DerivedStats::compute(&self.history, &self.counters, today, tz)
    }

    pub fn snapshot(&self) -> Option<Event> {
        let session = self.session.as_ref()?;
        Some(Event::StateSnapshot {
            phase: session.phase(),
            remaining_secs: session.remaining_secs(),
            duration_secs: session.duration_secs(),
            progress: session.progress(),
            position: session.position(),
            has_started: session.has_started(),
            message: self.scheduler.visible().cloned(),
            at: self.clock.now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the current session with a fresh, idle one.
    ///
    /// # Errors
    /// [`CoreError::InvalidSession`] if the descriptor does not validate,
    /// [`CoreError::InvalidTransition`] while a session is running or paused.
    pub fn create_session(&mut self, descriptor: SessionDescriptor) -> Result<Event> {
        if let Some(phase) = self.phase() {
            if matches!(phase, SessionPhase::Running | SessionPhase::Paused) {
                return Err(CoreError::InvalidTransition {
                    action: "create a session",
                    phase,
                });
            }
        }
        let state = SessionState::new(descriptor)?;
        self.scheduler.disarm();

        let desc = state.descriptor();
        let event = Event::SessionCreated {
            departure: desc.departure.code.clone(),
            arrival: desc.arrival.code.clone(),
            duration_secs: desc.duration_secs,
            at: self.clock.now(),
        };
        debug!(
            departure = %desc.departure.code,
            arrival = %desc.arrival.code,
            duration_secs = desc.duration_secs,
            "session created"
        );
        self.session = Some(state);
        Ok(event)
    }

    /// # Errors
    /// [`CoreError::NoSession`] or [`CoreError::InvalidTransition`] unless idle.
    pub fn start(&mut self) -> Result<Vec<Event>> {
        let session = self.session.as_mut().ok_or(CoreError::NoSession)?;
        session.start()?;
        let duration_secs = session.duration_secs();
        self.scheduler.arm();
        debug!(duration_secs, "session started");
        Ok(vec![Event::SessionStarted {
            duration_secs,
            at: self.clock.now(),
        }])
    }

    /// Freeze the countdown, cancel message timers and hide any message.
    ///
    /// # Errors
    /// [`CoreError::NoSession`] or [`CoreError::InvalidTransition`] unless running.
    pub fn pause(&mut self) -> Result<Vec<Event>> {
        let session = self.session.as_mut().ok_or(CoreError::NoSession)?;
        session.pause()?;
        let remaining_secs = session.remaining_secs();
        let at = self.clock.now();
        let mut events = vec![Event::SessionPaused { remaining_secs, at }];
        events.extend(self.scheduler.disarm().map(|change| self.change_event(change)));
        debug!(remaining_secs, "session paused");
        Ok(events)
    }

    /// # Errors
    /// [`CoreError::NoSession`] or [`CoreError::InvalidTransition`] unless paused.
    pub fn resume(&mut self) -> Result<Vec<Event>> {
        let session = self.session.as_mut().ok_or(CoreError::NoSession)?;
        session.resume()?;
        let remaining_secs = session.remaining_secs();
        self.scheduler.arm();
        debug!(remaining_secs, "session resumed");
        Ok(vec![Event::SessionResumed {
            remaining_secs,
            at: self.clock.now(),
        }])
    }

    /// Back to idle with the full duration. Allowed from any phase.
    ///
    /// # Errors
    /// [`CoreError::NoSession`] if no session was created.
    pub fn reset(&mut self) -> Result<Vec<Event>> {
        let session = self.session.as_mut().ok_or(CoreError::NoSession)?;
        session.reset();
        let mut events = vec![Event::SessionReset { at: self.clock.now() }];
        events.extend(self.scheduler.disarm().map(|change| self.change_event(change)));
        debug!("session reset");
        Ok(events)
    }

    /// Advance one second.
    ///
    /// # Errors
    /// [`CoreError::Persistence`] if the completion could not be written. The
    /// session is Completed and the in-memory history and counters already
    /// include it; see [`Self::last_completed`].
    pub fn on_tick(&mut self) -> Result<Vec<Event>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };
        let outcome = session.tick();
        let progress = session.progress();
        let flight_class = session.descriptor().flight_class;

        match outcome {
            TickOutcome::Ignored => Ok(Vec::new()),
            TickOutcome::Advanced => {
                let at = self.clock.now();
                let changes = self.scheduler.advance(1, progress, flight_class, at);
                Ok(changes.into_iter().map(|c| self.change_event(c)).collect())
            }
            TickOutcome::Completed => {
                let mut events: Vec<Event> = self
                    .scheduler
                    .disarm()
                    .map(|change| self.change_event(change))
                    .into_iter()
                    .collect();
                let record = self.complete()?;
                events.push(Event::SessionCompleted {
                    at: record.completed_at,
                    record,
                });
                Ok(events)
            }
        }
    }

    /// Choose the class for the next flight.
    ///
    /// Economy is always available. Business spends one credit, which is
    /// written to the store before it is taken from the in-memory counters.
    ///
    /// # Errors
    /// [`CoreError::InsufficientCredits`] with no credits left, or
    /// [`CoreError::Persistence`] if the debit could not be stored. Neither
    /// changes the counters.
    pub fn select_class(&mut self, class: FlightClass) -> Result<()> {
        if class == FlightClass::Economy {
            return Ok(());
        }
        let available = self.counters.business_credits;
        if available == 0 {
            return Err(CoreError::InsufficientCredits { available });
        }
        let remaining = available - 1;
        self.store.set(keys::BUSINESS_FLIGHTS, &remaining.to_string())?;
        self.counters.business_credits = remaining;
        info!(remaining, "business flight selected");
        Ok(())
    }

    /// Record that the first-run flow has been seen.
    ///
    /// Returns `true` if this was the first launch.
    ///
    /// # Errors
    /// [`CoreError::Persistence`] if the flag could not be stored.
    pub fn mark_onboarded(&mut self) -> Result<bool> {
        if self.counters.has_onboarded {
            return Ok(false);
        }
        self.store.set(keys::HAS_LAUNCHED, "true")?;
        self.counters.has_onboarded = true;
        Ok(true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn change_event(&self, change: MessageChange) -> Event {
        match change {
            MessageChange::Shown(message) => Event::MessageShown { message },
            MessageChange::Hidden => Event::MessageHidden { at: self.clock.now() },
        }
    }

    /// Log the finished session and update the counters, then write both in
    /// one batch. The in-memory view is updated even when the write fails.
    fn complete(&mut self) -> Result<HistoryRecord> {
        let Some(session) = self.session.as_ref() else {
            return Err(CoreError::NoSession);
        };
        let desc = session.descriptor();
        let at = self.clock.now();
        let minutes = desc.duration_minutes();
        let record = HistoryRecord {
            id: history::next_record_id(&self.history, at),
            departure_label: desc.departure.label.clone(),
            arrival_label: desc.arrival.label.clone(),
            duration_minutes: minutes,
            flight_class: desc.flight_class,
            seat: desc.seat.clone(),
            completed_at: at,
        };

        history::prepend(&mut self.history, record.clone(), self.settings.history_capacity);
        self.counters.total_focus_minutes = self.counters.total_focus_minutes.saturating_add(u64::from(minutes));
        let earned_credit = minutes >= self.settings.business_reward_threshold_min;
        if earned_credit {
            self.counters.business_credits = self.counters.business_credits.saturating_add(1);
        }
        self.last_completed = Some(record.clone());
        info!(
            id = %record.id,
            minutes,
            earned_credit,
            total_focus_minutes = self.counters.total_focus_minutes,
            "flight completed"
        );

        if let Err(e) = self.persist_completion() {
            warn!(error = %e, id = %record.id, "failed to persist completed flight");
            return Err(e.into());
        }
        Ok(record)
    }

    fn persist_completion(&mut self) -> std::result::Result<(), PersistenceError> {
        let mut entries = vec![(keys::FLIGHT_HISTORY, history::encode_history(&self.history)?)];
        entries.extend(self.counters.entries());
        self.store.set_many(&entries)
    }
}
