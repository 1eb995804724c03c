//! Temperature alignment and degree-day helpers
//!
//! Merges hourly meter readings with hourly outdoor temperature series into
//! a unified observation stream and provides the degree computations used by
//! the occupancy submodel and the legacy weather normalization.

use crate::app::models::{HourlyObservation, MeterReading, TemperatureReading};
use std::collections::BTreeMap;
use tracing::debug;

/// Merge meter readings with temperature readings on their hour timestamps
///
/// Performs an inner join: hours present in only one of the two inputs are
/// dropped. The result is ordered by time. Duplicate timestamps within an
/// input keep the last value seen, matching a last-write-wins reload of the
/// same hour.
pub fn merge_temperature_data(
    meter_data: &[MeterReading],
    temperature_data: &[TemperatureReading],
) -> Vec<HourlyObservation> {
    let temperatures: BTreeMap<_, _> = temperature_data
        .iter()
        .map(|reading| (reading.start, reading.temp_f))
        .collect();

    let mut merged: BTreeMap<_, _> = BTreeMap::new();
    for reading in meter_data {
        if let Some(&temp_f) = temperatures.get(&reading.start) {
            merged.insert(
                reading.start,
                HourlyObservation {
                    start: reading.start,
                    meter_value: reading.value,
                    temperature_mean: temp_f,
                },
            );
        }
    }

    debug!(
        "Merged {} meter readings with {} temperature readings into {} observations",
        meter_data.len(),
        temperature_data.len(),
        merged.len()
    );

    merged.into_values().collect()
}

/// Cooling degrees for one hour: how far the temperature sits above the base
pub fn cooling_degrees(temp_f: f64, base_f: f64) -> f64 {
    (temp_f - base_f).max(0.0)
}

/// Heating degrees for one hour: how far the temperature sits below the base
pub fn heating_degrees(temp_f: f64, base_f: f64) -> f64 {
    (base_f - temp_f).max(0.0)
}
