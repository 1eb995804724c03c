//! Tests for hourly coverage accounting

use super::{fixture_start, hourly_series, one_year_hourly};
use crate::app::services::segmentation::coverage::{hourly_coverage_by_month, missing_months};
use chrono::{TimeZone, Utc};
use std::collections::BTreeSet;

#[test]
fn test_full_year_coverage() {
    let observations = one_year_hourly();
    let coverage = hourly_coverage_by_month(&observations);

    assert_eq!(coverage.len(), 12);
    for month in 2..=12 {
        assert!((coverage[&month] - 1.0).abs() < 1e-9);
    }
    // January picks up the trailing boundary hour of the next year
    assert!(coverage[&1] > 1.0);
}

#[test]
fn test_partial_month_coverage() {
    // Half of June only
    let start = Utc.with_ymd_and_hms(2017, 6, 1, 0, 0, 0).unwrap();
    let observations = hourly_series(start, 15 * 24);

    let coverage = hourly_coverage_by_month(&observations);
    assert_eq!(coverage.len(), 1);
    assert!((coverage[&6] - 0.5).abs() < 1e-9);
}

#[test]
fn test_february_leap_year_denominator() {
    // 2016 was a leap year; a full February there is 29 days
    let start = Utc.with_ymd_and_hms(2016, 2, 1, 0, 0, 0).unwrap();
    let observations = hourly_series(start, 29 * 24);

    let coverage = hourly_coverage_by_month(&observations);
    assert!((coverage[&2] - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_input() {
    assert!(hourly_coverage_by_month(&[]).is_empty());
}

#[test]
fn test_missing_months() {
    let observed: BTreeSet<u32> = [1, 7, 8, 9, 10, 11, 12].into_iter().collect();
    assert_eq!(missing_months(&observed), vec![2, 3, 4, 5, 6]);

    let all: BTreeSet<u32> = (1..=12).collect();
    assert!(missing_months(&all).is_empty());

    let none: BTreeSet<u32> = BTreeSet::new();
    assert_eq!(missing_months(&none).len(), 12);
}

#[test]
fn test_fixture_start_is_calendar_aligned() {
    assert_eq!(fixture_start(), Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap());
}
