//! Tests for design matrix assembly

use super::{is_business_hour, shaped_series};
use crate::app::models::ModelWarning;
use crate::app::services::features::{
    DesignMatrix, FeatureComputer, FeatureValues, HourOfWeekComputer, TemperatureBinComputer,
    get_design_matrix,
};
use crate::app::services::segmentation::{Segment, SegmentType, SegmentedSeries, segment_timeseries};
use chrono::{Duration, TimeZone, Utc};

/// A deliberately broken computer that returns one value too few
struct TruncatingComputer;

impl FeatureComputer for TruncatingComputer {
    fn name(&self) -> &'static str {
        "truncating"
    }

    fn compute(&self, segment: &Segment) -> (FeatureValues, Vec<ModelWarning>) {
        let count = segment.len().saturating_sub(1);
        (FeatureValues::HourOfWeek(vec![1; count]), Vec::new())
    }
}

fn two_month_series() -> Vec<crate::app::models::HourlyObservation> {
    let start = Utc.with_ymd_and_hms(2017, 3, 1, 0, 0, 0).unwrap();
    (0..(61 * 24))
        .map(|i| crate::app::models::HourlyObservation {
            start: start + Duration::hours(i),
            meter_value: if is_business_hour(i as usize) { 8.0 } else { 1.0 },
            temperature_mean: 40.0 + (i % 48) as f64,
        })
        .collect()
}

#[test]
fn test_matrix_carries_all_features() {
    let observations = two_month_series();
    let (segmented, _) = segment_timeseries(&observations, SegmentType::OneMonth);

    let hour_of_week = HourOfWeekComputer;
    let bins = TemperatureBinComputer::new(vec![55.0, 75.0]);
    let (matrix, warnings) =
        get_design_matrix(&segmented, &[&hour_of_week, &bins]);

    assert!(warnings.is_empty());
    assert_eq!(matrix.segments.len(), 2);
    assert_eq!(matrix.total_rows(), 61 * 24);
    assert!(matrix.has_feature("hour_of_week"));
    assert!(matrix.has_feature("temperature_bins"));
    assert!(!matrix.has_feature("occupancy"));
    assert_eq!(matrix.bin_endpoints, vec![55.0, 75.0]);

    for segment in &matrix.segments {
        for row in &segment.rows {
            assert!(row.hour_of_week.is_some());
            assert_eq!(row.bin_values.len(), 2);
            assert!(row.occupied.is_none());
        }
    }
}

#[test]
fn test_unlabeled_segment_warns_but_is_processed() {
    let observations = shaped_series(48, |_| 1.0, |_| 60.0);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let hour_of_week = HourOfWeekComputer;
    let (matrix, warnings) = get_design_matrix(&segmented, &[&hour_of_week]);

    assert_eq!(matrix.total_rows(), 48);
    assert_eq!(warnings[0].qualified_name, "caltrack.hourly.missing_model_id");
    assert_eq!(warnings[0].data["segment_index"], 0);
}

#[test]
fn test_unmatched_index_invalidates_matrix() {
    let observations = two_month_series();
    let (segmented, _) = segment_timeseries(&observations, SegmentType::OneMonth);

    let broken = TruncatingComputer;
    let (matrix, warnings) = get_design_matrix(&segmented, &[&broken]);

    assert!(matrix.is_empty());
    assert_eq!(matrix, DesignMatrix::empty());

    let unmatched = warnings
        .iter()
        .find(|w| w.qualified_name == "caltrack.hourly.design_matrix_unmatched_index")
        .unwrap();
    assert_eq!(unmatched.data["function"], "truncating");
}

#[test]
fn test_empty_series_yields_empty_matrix() {
    let (segmented, _) = segment_timeseries(&[], SegmentType::OneMonth);
    let hour_of_week = HourOfWeekComputer;
    let (matrix, warnings) = get_design_matrix(&segmented, &[&hour_of_week]);

    assert!(matrix.is_empty());
    assert!(warnings.is_empty());
}
