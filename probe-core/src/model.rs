use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slots::TimeSlot;

/// Canonical identity of one query: a quantized point plus a time slot.
///
/// Coordinates are held as centi-degrees so equality and hashing are
/// exact: two intents that quantize alike are the same query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    lat_centi: i32,
    lng_centi: i32,
    slot: TimeSlot,
}

impl QueryKey {
    pub(crate) fn new(lat_centi: i32, lng_centi: i32, slot: TimeSlot) -> Self {
        Self { lat_centi, lng_centi, slot }
    }

    /// Latitude in degrees, quantized to 2 fractional digits.
    pub fn latitude(&self) -> f64 {
        f64::from(self.lat_centi) / 100.0
    }

    /// Longitude in degrees, quantized to 2 fractional digits.
    pub fn longitude(&self) -> f64 {
        f64::from(self.lng_centi) / 100.0
    }

    pub fn slot(&self) -> TimeSlot {
        self.slot
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}) @ {}", self.latitude(), self.longitude(), self.slot)
    }
}

/// Readings exactly as the location service reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReadings {
    pub temperature_k: f64,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: f64,
}

impl RawReadings {
    /// Convert to presentation units. Temperature goes Kelvin to Celsius;
    /// wind fields are copied verbatim.
    pub fn into_readings(self) -> Readings {
        Readings {
            temperature_c: self.temperature_k - 273.15,
            wind_speed_mps: self.wind_speed_mps,
            wind_direction_deg: self.wind_direction_deg,
        }
    }
}

/// Readings as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    /// Meteorological wind direction, 0..360 degrees.
    pub wind_direction_deg: f64,
}
