use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geo::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlightClass {
    #[default]
    Economy,
    Business,
}

impl FlightClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightClass::Economy => "economy",
            FlightClass::Business => "business",
        }
    }
}

impl fmt::Display for FlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "economy" => Ok(FlightClass::Economy),
            "business" => Ok(FlightClass::Business),
            other => Err(format!("unknown flight class: {other}")),
        }
    }
}

/// Everything needed to run one session. Fixed once the session is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub duration_secs: u32,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub flight_class: FlightClass,
    pub seat: String,
}

impl SessionDescriptor {
    pub fn new(
        duration_secs: u32,
        departure: Endpoint,
        arrival: Endpoint,
        flight_class: FlightClass,
        seat: impl Into<String>,
    ) -> Self {
        Self {
            duration_secs,
            departure,
            arrival,
            flight_class,
            seat: seat.into(),
        }
    }

    pub fn from_minutes(
        minutes: u32,
        departure: Endpoint,
        arrival: Endpoint,
        flight_class: FlightClass,
        seat: impl Into<String>,
    ) -> Self {
        Self::new(minutes.saturating_mul(60), departure, arrival, flight_class, seat)
    }

    /// Whole minutes credited to history and focus totals.
    ///
    /// Rounds down: a 1-second session is worth 0 minutes, 89 seconds is 1.
    pub fn duration_minutes(&self) -> u32 {
        self.duration_secs / 60
    }

    /// # Errors
    /// Returns [`CoreError::InvalidSession`] for a zero duration or a route
    /// whose departure and arrival are the same place.
    pub fn validate(&self) -> Result<()> {
        if self.duration_secs == 0 {
            return Err(CoreError::InvalidSession {
                reason: "duration must be at least one second".into(),
            });
        }
        if self.departure.same_place(&self.arrival) {
            return Err(CoreError::InvalidSession {
                reason: format!(
                    "arrival cannot be the same as departure ({})",
                    self.departure.code
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn endpoint(code: &str) -> Endpoint {
        Endpoint::new(code, code, Coordinates::new(0.0, 0.0))
    }

    #[test]
    fn identical_endpoints_are_rejected() {
        let d = SessionDescriptor::from_minutes(25, endpoint("JFK"), endpoint("JFK"), FlightClass::Economy, "A1");
        assert!(matches!(d.validate(), Err(CoreError::InvalidSession { .. })));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let d = SessionDescriptor::new(0, endpoint("JFK"), endpoint("LHR"), FlightClass::Economy, "A1");
        assert!(matches!(d.validate(), Err(CoreError::InvalidSession { .. })));
    }

    #[test]
    fn same_coordinates_different_airports_is_fine() {
        let d = SessionDescriptor::new(60, endpoint("JFK"), endpoint("LGA"), FlightClass::Business, "2A");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn minutes_round_down() {
        let mut d = SessionDescriptor::new(1, endpoint("JFK"), endpoint("LHR"), FlightClass::Economy, "A1");
        assert_eq!(d.duration_minutes(), 0);
        d.duration_secs = 89;
        assert_eq!(d.duration_minutes(), 1);
        d.duration_secs = 45 * 60;
        assert_eq!(d.duration_minutes(), 45);
    }

    #[test]
    fn flight_class_parses_case_insensitively() {
        assert_eq!("Business".parse::<FlightClass>().unwrap(), FlightClass::Business);
        assert_eq!("economy".parse::<FlightClass>().unwrap(), FlightClass::Economy);
        assert!("first".parse::<FlightClass>().is_err());
    }
}
