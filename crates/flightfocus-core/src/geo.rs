//! Route geometry for the flight framing.
//!
//! None of this is navigation-grade: positions are interpolated linearly in
//! lat/lon space and flight time is a rough great-circle estimate.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const CRUISE_SPEED_KMH: f64 = 800.0;
const MIN_FLIGHT_MINUTES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Point at fraction `t` (clamped to 0..=1) of the straight segment to `other`.
    pub fn lerp(&self, other: &Coordinates, t: f64) -> Coordinates {
        let t = t.clamp(0.0, 1.0);
        Coordinates {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Initial great-circle bearing towards `other`, in degrees from north
    /// (0..360, clockwise).
    pub fn initial_bearing_deg(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }
}

/// One end of a route. Identity is the `code`, not the coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub code: String,
    pub label: String,
    pub coordinates: Coordinates,
}

impl Endpoint {
    pub fn new(code: impl Into<String>, label: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            coordinates,
        }
    }

    pub fn same_place(&self, other: &Endpoint) -> bool {
        self.code.eq_ignore_ascii_case(&other.code)
    }
}

/// Estimated block time between two endpoints at cruise speed, never below 15 minutes.
pub fn estimate_flight_minutes(from: &Coordinates, to: &Coordinates) -> u32 {
    let hours = from.distance_km(to) / CRUISE_SPEED_KMH;
    let minutes = (hours * 60.0).round() as u32;
    minutes.max(MIN_FLIGHT_MINUTES)
}
