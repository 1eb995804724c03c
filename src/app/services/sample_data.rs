//! Embedded sample datasets
//!
//! Deterministic synthetic hourly datasets used by the documentation, the
//! CLI, and the test suite. Each sample covers one full calendar year plus a
//! trailing hour (8761 rows) so that a 365-day baseline keeps every row.
//! Temperature follows a seasonal curve with a diurnal swing; usage responds
//! to heating and cooling degrees and to a weekday occupancy schedule.

use crate::app::models::{MeterReading, TemperatureReading};
use crate::app::services::temperature::{cooling_degrees, heating_degrees};
use crate::constants::SAMPLE_NAMES;
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Metadata describing an embedded sample dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Sample name, e.g. `il-electricity-cdd-hdd-hourly`
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Reading frequency label
    pub freq: String,

    /// Meter unit label
    pub unit: String,

    /// Number of hourly rows
    pub rows: usize,

    /// First hour covered
    pub start: DateTime<Utc>,

    /// Last hour covered
    pub end: DateTime<Utc>,
}

/// Names of the available sample datasets
pub fn list_samples() -> Vec<&'static str> {
    SAMPLE_NAMES.to_vec()
}

/// Load a sample dataset by name
///
/// Returns the meter series, the temperature series, and the sample
/// metadata. Unknown names are an error.
pub fn load_sample(
    name: &str,
) -> Result<(Vec<MeterReading>, Vec<TemperatureReading>, SampleMetadata)> {
    match name {
        "il-electricity-cdd-hdd-hourly" => Ok(build_sample(
            name,
            "Synthetic hourly electricity data with heating and cooling response",
            electricity_usage,
        )),
        "il-gas-hdd-only-hourly" => Ok(build_sample(
            name,
            "Synthetic hourly natural gas data with heating-only response",
            gas_usage,
        )),
        _ => Err(Error::unknown_sample(name)),
    }
}

/// Start of the sample year
fn sample_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()
}

fn build_sample(
    name: &str,
    description: &str,
    usage: fn(DateTime<Utc>, f64) -> f64,
) -> (Vec<MeterReading>, Vec<TemperatureReading>, SampleMetadata) {
    let start = sample_start();
    let rows = 8761;

    let mut meter_data = Vec::with_capacity(rows);
    let mut temperature_data = Vec::with_capacity(rows);

    for i in 0..rows {
        let timestamp = start + Duration::hours(i as i64);
        let temp_f = sample_temperature(timestamp);
        temperature_data.push(TemperatureReading {
            start: timestamp,
            temp_f,
        });
        meter_data.push(MeterReading {
            start: timestamp,
            value: usage(timestamp, temp_f),
        });
    }

    let metadata = SampleMetadata {
        name: name.to_string(),
        description: description.to_string(),
        freq: "hourly".to_string(),
        unit: "kWh".to_string(),
        rows,
        start,
        end: start + Duration::hours(rows as i64 - 1),
    };

    (meter_data, temperature_data, metadata)
}

/// Deterministic Illinois-like temperature: seasonal curve, diurnal swing,
/// and a small short-period ripple standing in for weather noise
fn sample_temperature(timestamp: DateTime<Utc>) -> f64 {
    let day_of_year = timestamp.ordinal0() as f64 + timestamp.hour() as f64 / 24.0;
    let seasonal = 52.0 - 25.0 * (TAU * (day_of_year - 15.0) / 365.25).cos();
    let diurnal = 8.0 * (TAU * (timestamp.hour() as f64 - 9.0) / 24.0).sin();
    let ripple = 4.0 * (TAU * day_of_year / 5.3).sin() + 2.0 * (TAU * day_of_year / 1.7).cos();
    seasonal + diurnal + ripple
}

/// Electricity usage: base load, weekday occupancy, cooling and heating
/// response
fn electricity_usage(timestamp: DateTime<Utc>, temp_f: f64) -> f64 {
    let weekday = timestamp.weekday().num_days_from_monday() < 5;
    let hour = timestamp.hour();
    let occupied = weekday && (8..18).contains(&hour);

    let base = 0.4;
    let occupancy_load = if occupied { 0.6 } else { 0.0 };
    let cooling = 0.08 * cooling_degrees(temp_f, 65.0);
    let heating = 0.03 * heating_degrees(temp_f, 50.0);

    base + occupancy_load + cooling + heating
}

/// Natural gas usage: small base load plus heating response only
fn gas_usage(timestamp: DateTime<Utc>, temp_f: f64) -> f64 {
    let hour = timestamp.hour();
    let overnight_setback = if (0..6).contains(&hour) { 0.8 } else { 1.0 };

    0.05 + 0.02 * heating_degrees(temp_f, 60.0) * overnight_setback
}
