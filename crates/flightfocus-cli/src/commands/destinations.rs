use flightfocus_core::catalog::AIRPORTS;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&AIRPORTS)?);
        return Ok(());
    }

    for airport in &AIRPORTS {
        println!(
            "{}  {:<12} {:<12} {:>9.4} {:>10.4}",
            airport.code, airport.city, airport.country, airport.coordinates.lat, airport.coordinates.lon
        );
    }
    Ok(())
}
