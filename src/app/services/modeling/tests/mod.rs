//! Tests for model fitting and prediction
//!
//! The main fixture generates a year of usage from a process the model can
//! represent exactly (hour-of-week base load plus a linear cooling response
//! above 65F), so fitted coefficients and predictions can be checked
//! against the generator to tight tolerances.


use crate::app::models::{HourlyObservation, TemperatureReading};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::f64::consts::TAU;

/// Cooling slope of the generating process (kWh per degree above 65F)
pub const COOLING_SLOPE: f64 = 0.5;

/// First hour of the fixture year
pub fn fixture_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()
}

/// Deterministic temperature for hour index `i`: an annual swing plus a
/// diurnal wiggle, spanning roughly 15F to 85F
pub fn temperature_at(i: usize) -> f64 {
    let annual = 30.0 * (TAU * i as f64 / 8760.0).sin();
    let diurnal = 5.0 * (TAU * i as f64 / 24.0).sin();
    50.0 + annual + diurnal
}

/// Usage generated from the hour-of-week base load plus cooling response
pub fn usage_at(hour_of_week: u32, temp_f: f64) -> f64 {
    1.0 + 0.01 * hour_of_week as f64 + COOLING_SLOPE * (temp_f - 65.0).max(0.0)
}

/// A full year (8760 rows) of generated hourly observations
pub fn generated_year() -> Vec<HourlyObservation> {
    (0..8760)
        .map(|i| {
            let start = fixture_start() + Duration::hours(i as i64);
            let temp = temperature_at(i);
            let mut obs = HourlyObservation {
                start,
                meter_value: 0.0,
                temperature_mean: temp,
            };
            obs.meter_value = usage_at(obs.hour_of_week(), temp);
            obs
        })
        .collect()
}

/// The fixture year's temperatures as a standalone series
pub fn generated_year_temperatures() -> Vec<TemperatureReading> {
    (0..8760)
        .map(|i| TemperatureReading {
            start: fixture_start() + Duration::hours(i as i64),
            temp_f: temperature_at(i),
        })
        .collect()
}
