use flightfocus_core::Config;

use super::open_engine;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = open_engine(&config)?;
    let stats = engine.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Flights:           {}", stats.total_flights);
    println!("Focus time:        {} min", stats.total_focus_minutes);
    println!("Average flight:    {} min", stats.average_session_minutes);
    println!("Longest flight:    {} min", stats.longest_session_minutes);
    println!("Current streak:    {} days", stats.current_streak_days);
    println!("Business flights:  {}", stats.business_credits);
    Ok(())
}
