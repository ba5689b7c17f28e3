use flightfocus_core::Config;

use super::open_engine;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut engine = open_engine(&config)?;

    if engine.mark_onboarded()? {
        println!("Welcome aboard FlightFocus!");
        println!();
        println!("Every focus session is a flight. Pick a departure and a destination,");
        println!("stay focused until you land, and the flight goes into your logbook.");
        println!();
        println!(
            "You start with {} business class flights. Flights of {} minutes or more earn another.",
            engine.counters().business_credits,
            config.rewards.business_reward_threshold_min
        );
        println!();
        println!("Try: flightfocus fly --from JFK --to LHR");
    } else {
        println!("Welcome back! Run `flightfocus destinations` to plan your next flight.");
    }
    Ok(())
}
