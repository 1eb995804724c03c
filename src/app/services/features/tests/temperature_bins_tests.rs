//! Tests for temperature bin validation and bases

use super::shaped_series;
use crate::app::services::features::{
    FeatureComputer, FeatureValues, TemperatureBinComputer, bin_bases, bin_labels,
    validate_temperature_bins,
};
use crate::app::services::segmentation::SegmentedSeries;
use crate::constants::DEFAULT_TEMPERATURE_BIN_ENDPOINTS;

#[test]
fn test_bin_bases_partition_the_rise() {
    let endpoints = [30.0, 45.0, 55.0, 65.0, 75.0, 90.0];

    // Below the first endpoint: every basis zero
    assert!(bin_bases(20.0, &endpoints).iter().all(|v| *v == 0.0));

    // Inside the second bin
    let bases = bin_bases(50.0, &endpoints);
    assert_eq!(bases.len(), 6);
    assert_eq!(bases[0], 15.0); // 30..45 saturated
    assert_eq!(bases[1], 5.0); // 45..55 partial
    assert!(bases[2..].iter().all(|v| *v == 0.0));

    // Above the last endpoint: all interior bases saturated plus overflow
    let bases = bin_bases(95.0, &endpoints);
    assert_eq!(bases[0], 15.0);
    assert_eq!(bases[4], 15.0);
    assert_eq!(bases[5], 5.0);

    // Total rise above the first endpoint is recovered exactly
    let total: f64 = bin_bases(82.0, &endpoints).iter().sum();
    assert!((total - (82.0 - 30.0)).abs() < 1e-12);
}

#[test]
fn test_bin_labels() {
    let labels = bin_labels(&[30.0, 45.0, 90.0]);
    assert_eq!(labels, vec!["bin_30_45", "bin_45_90", "bin_gt90"]);

    assert_eq!(bin_labels(&[62.5]), vec!["bin_gt62.5"]);
    assert!(bin_labels(&[]).is_empty());
    assert!(bin_bases(70.0, &[]).is_empty());
}

#[test]
fn test_validation_keeps_well_populated_endpoints() {
    // 25 observations on each side of every endpoint
    let mut temps = Vec::new();
    for center in [25.0, 37.0, 50.0, 60.0, 70.0, 82.0, 95.0] {
        temps.extend(std::iter::repeat(center).take(25));
    }

    let (kept, warnings) =
        validate_temperature_bins(&temps, DEFAULT_TEMPERATURE_BIN_ENDPOINTS, 20);

    assert_eq!(kept, DEFAULT_TEMPERATURE_BIN_ENDPOINTS.to_vec());
    assert!(warnings.is_empty());
}

#[test]
fn test_validation_drops_sparse_cold_endpoint() {
    // Nothing below 30 and only a handful below 45
    let mut temps = vec![40.0; 5];
    for center in [50.0, 60.0, 70.0, 82.0, 95.0] {
        temps.extend(std::iter::repeat(center).take(25));
    }

    let (kept, warnings) =
        validate_temperature_bins(&temps, DEFAULT_TEMPERATURE_BIN_ENDPOINTS, 20);

    assert_eq!(kept, vec![55.0, 65.0, 75.0, 90.0]);
    assert_eq!(warnings.len(), 2);
    assert!(
        warnings
            .iter()
            .all(|w| w.qualified_name == "caltrack.hourly.dropped_temperature_bin")
    );
    assert_eq!(warnings[0].data["endpoint"], 30.0);
    assert_eq!(warnings[1].data["endpoint"], 45.0);
}

#[test]
fn test_validation_with_too_little_data_drops_everything() {
    let temps = vec![60.0; 5];
    let (kept, warnings) =
        validate_temperature_bins(&temps, DEFAULT_TEMPERATURE_BIN_ENDPOINTS, 20);

    assert!(kept.is_empty());
    assert_eq!(warnings.len(), DEFAULT_TEMPERATURE_BIN_ENDPOINTS.len());
}

#[test]
fn test_computer_annotates_rows_with_bases() {
    let observations = shaped_series(24, |_| 1.0, |i| 40.0 + i as f64 * 2.0);
    let segmented = SegmentedSeries::from_unsegmented(&observations);

    let computer = TemperatureBinComputer::new(vec![45.0, 65.0]);
    let (values, warnings) = computer.compute(&segmented.segments[0]);

    assert!(warnings.is_empty());
    let FeatureValues::TemperatureBins { endpoints, bases } = values else {
        panic!("expected temperature bin values");
    };
    assert_eq!(endpoints, vec![45.0, 65.0]);
    assert_eq!(bases.len(), 24);

    // Hour 0 is 40F: below every endpoint
    assert_eq!(bases[0], vec![0.0, 0.0]);
    // Hour 10 is 60F: partial first bin
    assert_eq!(bases[10], vec![15.0, 0.0]);
    // Hour 23 is 86F: saturated first bin plus overflow
    assert_eq!(bases[23], vec![20.0, 21.0]);
}
