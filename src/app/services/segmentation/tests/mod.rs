//! Tests for baseline segmentation
//!
//! Fixtures build a calendar year of hourly observations (8761 rows, the
//! trailing row being the first hour of the next year) so that coverage and
//! row-count arithmetic is exact.

pub mod coverage_tests;

use crate::app::models::HourlyObservation;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// First hour of the fixture year
pub fn fixture_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()
}

/// One calendar year of hourly observations plus the trailing hour
/// (8761 rows), each with meter value 1.0
pub fn one_year_hourly() -> Vec<HourlyObservation> {
    hourly_series(fixture_start(), 8761)
}

/// `count` hourly observations starting at `start`, meter value 1.0
pub fn hourly_series(start: DateTime<Utc>, count: usize) -> Vec<HourlyObservation> {
    (0..count)
        .map(|i| HourlyObservation {
            start: start + Duration::hours(i as i64),
            meter_value: 1.0,
            temperature_mean: 50.0,
        })
        .collect()
}
