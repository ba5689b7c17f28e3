//! Built-in airport catalog.

use serde::Serialize;

use crate::geo::{Coordinates, Endpoint};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Airport {
    pub code: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub coordinates: Coordinates,
}

impl Airport {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.code, self.city, self.coordinates)
    }
}

const fn airport(code: &'static str, city: &'static str, country: &'static str, lat: f64, lon: f64) -> Airport {
    Airport {
        code,
        city,
        country,
        coordinates: Coordinates::new(lat, lon),
    }
}

pub static AIRPORTS: [Airport; 20] = [
    airport("JFK", "New York", "USA", 40.6413, -73.7781),
    airport("LHR", "London", "UK", 51.47, -0.4543),
    airport("NRT", "Tokyo", "Japan", 35.7653, 140.3856),
    airport("CDG", "Paris", "France", 49.0097, 2.5479),
    airport("DXB", "Dubai", "UAE", 25.2532, 55.3657),
    airport("SIN", "Singapore", "Singapore", 1.3644, 103.9915),
    airport("LAX", "Los Angeles", "USA", 33.9425, -118.4081),
    airport("SYD", "Sydney", "Australia", -33.9399, 151.1753),
    airport("AMS", "Amsterdam", "Netherlands", 52.3105, 4.7683),
    airport("FRA", "Frankfurt", "Germany", 50.0379, 8.5622),
    airport("HKG", "Hong Kong", "Hong Kong", 22.308, 113.9185),
    airport("BCN", "Barcelona", "Spain", 41.2974, 2.0833),
    airport("FCO", "Rome", "Italy", 41.7999, 12.2462),
    airport("BKK", "Bangkok", "Thailand", 13.69, 100.7501),
    airport("BOM", "Mumbai", "India", 19.0896, 72.8656),
    airport("GRU", "São Paulo", "Brazil", -23.4356, -46.4731),
    airport("CAI", "Cairo", "Egypt", 30.1219, 31.4056),
    airport("IST", "Istanbul", "Turkey", 41.2753, 28.7519),
    airport("YYZ", "Toronto", "Canada", 43.6777, -79.6248),
    airport("SVO", "Moscow", "Russia", 55.9726, 37.4146),
];

/// Look up an airport by IATA code, ignoring case.
pub fn find(code: &str) -> Option<&'static Airport> {
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<_> = AIRPORTS.iter().map(|a| a.code).collect();
        assert_eq!(codes.len(), AIRPORTS.len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find("lhr").map(|a| a.city), Some("London"));
        assert_eq!(find(" GRU ").map(|a| a.city), Some("São Paulo"));
        assert!(find("XXX").is_none());
    }

    #[test]
    fn endpoint_uses_city_as_label() {
        let ep = find("NRT").unwrap().endpoint();
        assert_eq!(ep.code, "NRT");
        assert_eq!(ep.label, "Tokyo");
    }
}
