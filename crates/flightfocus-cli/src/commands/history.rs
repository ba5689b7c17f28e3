use chrono::Local;
use flightfocus_core::Config;

use super::open_engine;

pub fn run(limit: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = open_engine(&config)?;
    let flights = &engine.history()[..limit.min(engine.history().len())];

    if json {
        println!("{}", serde_json::to_string_pretty(flights)?);
        return Ok(());
    }

    if flights.is_empty() {
        println!("No flights yet.");
        return Ok(());
    }
    for record in flights {
        println!(
            "{}  {} -> {}  {} min  {} {}",
            record.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.departure_label,
            record.arrival_label,
            record.duration_minutes,
            record.flight_class,
            record.seat,
        );
    }
    Ok(())
}
