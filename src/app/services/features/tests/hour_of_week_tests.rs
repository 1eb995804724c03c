//! Tests for the hour-of-week feature

use super::shaped_series;
use crate::app::services::features::{FeatureComputer, FeatureValues, HourOfWeekComputer};
use crate::app::services::segmentation::SegmentedSeries;

#[test]
fn test_full_week_covers_all_hours() {
    let observations = shaped_series(168, |_| 1.0, |_| 60.0);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let (values, warnings) = HourOfWeekComputer.compute(&segmented.segments[0]);

    assert!(warnings.is_empty());
    let FeatureValues::HourOfWeek(hours) = values else {
        panic!("expected hour-of-week values");
    };
    assert_eq!(hours.len(), 168);
    // Fixture starts Monday 00:00, so hours run 1..=168 in order
    assert_eq!(hours[0], 1);
    assert_eq!(hours[167], 168);
    let mut sorted = hours.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 168);
}

#[test]
fn test_partial_week_warns_missing_hours() {
    // Two days only: 48 distinct hours, 120 missing
    let observations = shaped_series(48, |_| 1.0, |_| 60.0);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let (_, warnings) = HourOfWeekComputer.compute(&segmented.segments[0]);

    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].qualified_name,
        "caltrack.hourly.missing_hours_of_week"
    );
    assert_eq!(warnings[0].data["num_missing_hours"], 120);
}

#[test]
fn test_empty_segment_produces_no_values_or_warnings() {
    let segmented = SegmentedSeries::from_unsegmented(&[]);

    let (values, warnings) = HourOfWeekComputer.compute(&segmented.segments[0]);

    assert!(warnings.is_empty());
    assert!(values.is_empty());
}
