//! Hourly coverage accounting for segmentation
//!
//! Coverage is measured per calendar month label: the observed hour count
//! for a month, summed across years, divided by the hour count of a single
//! instance of that month. A trailing boundary hour (the inclusive baseline
//! endpoint) therefore nudges a month slightly above full coverage rather
//! than registering a second, nearly empty month instance.

use crate::app::models::HourlyObservation;
use crate::constants::hours_in_month;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};

/// Hourly coverage fraction per observed calendar month
///
/// For each month label that appears in the data, returns
/// `observed_hours / hours_in_month`, where `hours_in_month` is taken from
/// the first year in which the month appears.
pub fn hourly_coverage_by_month(observations: &[HourlyObservation]) -> BTreeMap<u32, f64> {
    let mut observed_hours: BTreeMap<u32, usize> = BTreeMap::new();
    let mut first_year: BTreeMap<u32, i32> = BTreeMap::new();

    for obs in observations {
        let month = obs.month();
        *observed_hours.entry(month).or_insert(0) += 1;
        first_year
            .entry(month)
            .and_modify(|year| *year = (*year).min(obs.start.year()))
            .or_insert_with(|| obs.start.year());
    }

    observed_hours
        .into_iter()
        .map(|(month, count)| {
            let year = first_year[&month];
            let expected = hours_in_month(year, month) as f64;
            (month, count as f64 / expected)
        })
        .collect()
}

/// Calendar months (1..=12) with no observations at all
pub fn missing_months(observed_months: &BTreeSet<u32>) -> Vec<u32> {
    (1..=12)
        .filter(|month| !observed_months.contains(month))
        .collect()
}
