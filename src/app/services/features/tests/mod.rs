//! Tests for feature derivation
//!
//! Fixtures build short deterministic hourly series with controllable
//! usage and temperature shapes so that occupancy and bin assertions are
//! exact.

pub mod design_matrix_tests;
pub mod hour_of_week_tests;
pub mod occupancy_tests;
pub mod temperature_bins_tests;

use crate::app::models::HourlyObservation;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// First hour of the fixture period: Monday 2017-01-02 00:00
pub fn fixture_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 1, 2, 0, 0, 0).unwrap()
}

/// `count` hourly observations with usage and temperature supplied per hour
/// index
pub fn shaped_series(
    count: usize,
    usage: impl Fn(usize) -> f64,
    temperature: impl Fn(usize) -> f64,
) -> Vec<HourlyObservation> {
    (0..count)
        .map(|i| HourlyObservation {
            start: fixture_start() + Duration::hours(i as i64),
            meter_value: usage(i),
            temperature_mean: temperature(i),
        })
        .collect()
}

/// Whether hour index `i` (0-based from Monday 00:00) falls in weekday
/// business hours (09:00..=17:00, Monday to Friday)
pub fn is_business_hour(i: usize) -> bool {
    let hour_of_week = i % 168;
    let day = hour_of_week / 24;
    let hour = hour_of_week % 24;
    day < 5 && (9..=17).contains(&hour)
}
