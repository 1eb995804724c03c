//! Tests for the occupancy submodel and lookup

use super::{is_business_hour, shaped_series};
use crate::app::models::ModelId;
use crate::app::services::features::{
    FeatureComputer, FeatureValues, OccupancyComputer, compute_occupancy,
};
use crate::app::services::segmentation::SegmentedSeries;
use crate::constants::DEFAULT_OCCUPANCY_THRESHOLD;

/// Temperature shape with both heating and cooling signal but no weekly
/// periodicity aligned to the occupancy pattern
fn wavy_temperature(i: usize) -> f64 {
    60.0 + 20.0 * ((i as f64) * 0.37).sin()
}

/// Usage dominated by a business-hours occupancy signal
fn business_usage(i: usize) -> f64 {
    if is_business_hour(i) { 10.0 } else { 1.0 }
}

#[test]
fn test_business_hours_detected_as_occupied() {
    // Two full weeks so every hour of week appears twice
    let observations = shaped_series(336, business_usage, wavy_temperature);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let (lookup, warnings) = compute_occupancy(&segmented, DEFAULT_OCCUPANCY_THRESHOLD);

    assert!(warnings.is_empty());
    assert_eq!(lookup.segments.len(), 1);
    let segment = &lookup.segments[0];
    assert_eq!(segment.occupied.len(), 168);

    // Weekday 09:00..=17:00 is 5 days x 9 hours
    assert_eq!(segment.occupied_hours(), 45);
    for hour_of_week in 1..=168u32 {
        let expected = is_business_hour((hour_of_week - 1) as usize);
        assert_eq!(segment.is_occupied(hour_of_week), expected);
    }
}

#[test]
fn test_constant_temperature_fails_submodel() {
    // Degree-day columns are all zero, so the submodel is singular
    let observations = shaped_series(336, business_usage, |_| 60.0);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let (lookup, warnings) = compute_occupancy(&segmented, DEFAULT_OCCUPANCY_THRESHOLD);

    assert!(lookup.segments.is_empty());
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].qualified_name,
        "caltrack.hourly.failed_occupancy_model"
    );
}

#[test]
fn test_lookup_defaults_to_unoccupied() {
    let lookup = compute_occupancy(
        &SegmentedSeries::from_unsegmented(&[]),
        DEFAULT_OCCUPANCY_THRESHOLD,
    )
    .0;

    assert!(!lookup.is_occupied(&ModelId::single_month(1), 10));
    assert!(lookup.segment(&ModelId::single_month(1)).is_none());
}

#[test]
fn test_occupancy_computer_annotates_rows() {
    let observations = shaped_series(336, business_usage, wavy_temperature);
    let segmented = SegmentedSeries::from_unsegmented(&observations);
    let (lookup, _) = compute_occupancy(&segmented, DEFAULT_OCCUPANCY_THRESHOLD);

    let computer = OccupancyComputer::new(lookup);
    let (values, warnings) = computer.compute(&segmented.segments[0]);

    assert!(warnings.is_empty());
    let FeatureValues::Occupancy(flags) = values else {
        panic!("expected occupancy values");
    };
    assert_eq!(flags.len(), 336);
    for (i, flag) in flags.iter().enumerate() {
        assert_eq!(*flag, is_business_hour(i));
    }
}

#[test]
fn test_out_of_range_hour_is_unoccupied() {
    let observations = shaped_series(336, business_usage, wavy_temperature);
    let segmented = SegmentedSeries::from_unsegmented(&observations);
    let (lookup, _) = compute_occupancy(&segmented, DEFAULT_OCCUPANCY_THRESHOLD);

    let model_id = lookup.segments[0].model_id.clone();
    assert!(!lookup.is_occupied(&model_id, 0));
    assert!(!lookup.is_occupied(&model_id, 169));
}
