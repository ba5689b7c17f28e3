use clap::Subcommand;
use flightfocus_core::{Config, FlightClass};

use super::open_engine;

#[derive(Subcommand)]
pub enum ClassAction {
    /// Select a class for the next flight. Business spends one credit.
    Select {
        /// economy or business
        class: FlightClass,
    },
    /// Show remaining business flights
    Credits,
}

pub fn run(action: ClassAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut engine = open_engine(&config)?;

    match action {
        ClassAction::Select { class } => {
            engine.select_class(class)?;
            match class {
                FlightClass::Economy => println!("Economy class selected."),
                FlightClass::Business => println!(
                    "Business class selected. {} business flights left.",
                    engine.counters().business_credits
                ),
            }
        }
        ClassAction::Credits => {
            println!("{}", engine.counters().business_credits);
        }
    }
    Ok(())
}
