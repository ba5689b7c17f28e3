//! Live flight: one session driven by a one-second ticker.
//!
//! Stdin commands while flying: `p` pause, `r` resume (or take off again
//! after a reset), `x` reset to the gate, `q` abandon.

use std::time::Duration;

use clap::Args;
use flightfocus_core::catalog;
use flightfocus_core::{
    estimate_flight_minutes, Config, CoreError, Event, FlightClass, SessionDescriptor, SessionEngine,
    SessionPhase, SessionStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::open_engine;

#[derive(Args)]
pub struct FlyArgs {
    /// Departure airport code (see `flightfocus destinations`)
    #[arg(long)]
    from: String,
    /// Arrival airport code
    #[arg(long)]
    to: String,
    /// Session length in minutes. Defaults to the estimated flight time.
    #[arg(long, conflicts_with = "seconds")]
    minutes: Option<u32>,
    /// Session length in seconds
    #[arg(long)]
    seconds: Option<u32>,
    /// economy or business. Business spends one credit.
    #[arg(long)]
    class: Option<FlightClass>,
    /// Seat number
    #[arg(long)]
    seat: Option<String>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: FlyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(fly(args))
}

async fn fly(args: FlyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let departure = catalog::find(&args.from).ok_or_else(|| format!("unknown airport code: {}", args.from))?;
    let arrival = catalog::find(&args.to).ok_or_else(|| format!("unknown airport code: {}", args.to))?;

    let duration_secs = match (args.seconds, args.minutes) {
        (Some(secs), _) => secs,
        (None, Some(minutes)) => minutes.saturating_mul(60),
        (None, None) => estimate_flight_minutes(&departure.coordinates, &arrival.coordinates) * 60,
    };
    let class = args.class.unwrap_or(config.defaults.flight_class);
    let seat = args.seat.unwrap_or_else(|| config.defaults.seat.clone());
    let descriptor = SessionDescriptor::new(duration_secs, departure.endpoint(), arrival.endpoint(), class, seat);
    descriptor.validate()?;

    let mut engine = open_engine(&config)?;
    engine.select_class(class)?;
    let mut out = Printer { json: args.json };

    out.event(&engine.create_session(descriptor)?)?;
    out.events(&engine.start()?)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // A remote message fetch can hold a tick; fire the missed ones right after.
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut elapsed: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = match engine.on_tick() {
                    Ok(events) => events,
                    Err(CoreError::Persistence(e)) => {
                        if let Some(record) = engine.last_completed() {
                            out.landed(record)?;
                        }
                        return Err(format!("flight completed but could not be saved: {e}").into());
                    }
                    Err(e) => return Err(e.into()),
                };
                out.events(&events)?;
                if engine.phase() == Some(SessionPhase::Running) {
                    elapsed += 1;
                    if elapsed % 60 == 0 {
                        out.status(&engine)?;
                    }
                }
                if engine.phase() == Some(SessionPhase::Completed) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_command(line.trim(), &mut engine, &mut out)? {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("stdin closed, commands disabled");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "could not read stdin");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                engine.reset()?;
                out.note("Flight abandoned.");
                break;
            }
        }
    }
    Ok(())
}

/// Returns `false` when the flight should end.
fn handle_command<S: SessionStore>(
    command: &str,
    engine: &mut SessionEngine<S>,
    out: &mut Printer,
) -> Result<bool, Box<dyn std::error::Error>> {
    let result = match command {
        "p" => engine.pause(),
        // Start again after a reset, otherwise resume.
        "r" if engine.session().is_some_and(|s| !s.has_started()) => engine.start(),
        "r" => engine.resume(),
        "x" => engine.reset(),
        "q" => {
            engine.reset()?;
            out.note("Flight abandoned.");
            return Ok(false);
        }
        "" => return Ok(true),
        other => {
            out.note(&format!("unknown command '{other}' (p pause, r resume, x reset, q quit)"));
            return Ok(true);
        }
    };
    match result {
        Ok(events) => {
            out.events(&events)?;
            out.status(engine)?;
        }
        Err(e @ CoreError::InvalidTransition { .. }) => out.note(&e.to_string()),
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

struct Printer {
    json: bool,
}

impl Printer {
    fn events(&mut self, events: &[Event]) -> Result<(), serde_json::Error> {
        events.iter().try_for_each(|e| self.event(e))
    }

    fn event(&mut self, event: &Event) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }
        match event {
            Event::SessionCreated {
                departure,
                arrival,
                duration_secs,
                ..
            } => println!("Flight {departure} -> {arrival} ready, {}", clock_text(*duration_secs)),
            Event::SessionStarted { .. } => println!("Departing now. Enjoy your flight."),
            Event::SessionPaused { remaining_secs, .. } => {
                println!("Paused with {} to go.", clock_text(*remaining_secs))
            }
            Event::SessionResumed { .. } => println!("Resumed."),
            Event::SessionReset { .. } => println!("Back at the gate."),
            Event::SessionCompleted { record, .. } => self.landed(record)?,
            Event::MessageShown { message } => println!("  Attendant: {}", message.message),
            Event::MessageHidden { .. } => {}
            Event::StateSnapshot { .. } => println!("{}", serde_json::to_string(event)?),
        }
        Ok(())
    }

    fn landed(&mut self, record: &flightfocus_core::HistoryRecord) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!(
                "Landed in {} after {} min. Flight {} logged.",
                record.arrival_label, record.duration_minutes, record.id
            );
        }
        Ok(())
    }

    fn status<S: SessionStore>(&mut self, engine: &SessionEngine<S>) -> Result<(), serde_json::Error> {
        let Some(snapshot) = engine.snapshot() else {
            return Ok(());
        };
        if self.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else if let Event::StateSnapshot {
            phase,
            remaining_secs,
            progress,
            position,
            ..
        } = snapshot
        {
            let heading = engine
                .session()
                .map(|s| position.initial_bearing_deg(&s.descriptor().arrival.coordinates))
                .unwrap_or_default();
            println!(
                "  [{phase}] {} remaining, {:.0}% of the way, at {:.2}, {:.2} heading {:03.0}",
                clock_text(remaining_secs),
                progress * 100.0,
                position.lat,
                position.lon,
                heading
            );
        }
        Ok(())
    }

    fn note(&mut self, text: &str) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }
}

/// `h:mm:ss` or `m:ss`.
fn clock_text(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
