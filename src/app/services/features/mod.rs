//! Feature derivation for the hourly method
//!
//! Feature computers annotate segmented observations with the regressors the
//! consumption models need: the hour-of-week category, the occupancy
//! indicator, and piecewise-linear temperature bin bases. The design matrix
//! builder runs a set of computers over every segment and validates that each
//! computer returns one value per row.

pub mod hour_of_week;
pub mod occupancy;
pub mod temperature_bins;

#[cfg(test)]
pub mod tests;

pub use hour_of_week::HourOfWeekComputer;
pub use occupancy::{OccupancyComputer, OccupancyLookup, SegmentOccupancy, compute_occupancy};
pub use temperature_bins::{
    TemperatureBinComputer, bin_bases, bin_labels, validate_temperature_bins,
};

use crate::app::models::{ModelId, ModelWarning, WeightedObservation};
use crate::app::services::segmentation::{Segment, SegmentedSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Per-segment feature values returned by a computer
///
/// Each variant carries one value per segment row, in row order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValues {
    /// Hour-of-week category per row (1..=168)
    HourOfWeek(Vec<u32>),

    /// Occupancy indicator per row
    Occupancy(Vec<bool>),

    /// Temperature bin bases per row, with the validated endpoints that
    /// generated them
    TemperatureBins {
        endpoints: Vec<f64>,
        bases: Vec<Vec<f64>>,
    },
}

impl FeatureValues {
    /// Number of rows covered by these values
    pub fn len(&self) -> usize {
        match self {
            FeatureValues::HourOfWeek(values) => values.len(),
            FeatureValues::Occupancy(values) => values.len(),
            FeatureValues::TemperatureBins { bases, .. } => bases.len(),
        }
    }

    /// Whether these values cover no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A feature computer: derives one feature over a segment's rows
pub trait FeatureComputer {
    /// Stable feature name used in design matrix bookkeeping
    fn name(&self) -> &'static str;

    /// Compute the feature for every row of the segment
    fn compute(&self, segment: &Segment) -> (FeatureValues, Vec<ModelWarning>);
}

/// One design matrix row: the weighted observation plus derived features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Weighted observation the features were derived from
    pub row: WeightedObservation,

    /// Hour-of-week category (1..=168), when computed
    pub hour_of_week: Option<u32>,

    /// Occupancy indicator, when computed
    pub occupied: Option<bool>,

    /// Temperature bin basis values, when computed
    pub bin_values: Vec<f64>,
}

impl FeatureRow {
    fn from_observation(row: WeightedObservation) -> Self {
        Self {
            row,
            hour_of_week: None,
            occupied: None,
            bin_values: Vec::new(),
        }
    }
}

/// One segment's worth of design matrix rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFeatures {
    /// Months covered by the segment's model
    pub model_id: ModelId,

    /// Feature rows in observation order
    pub rows: Vec<FeatureRow>,
}

/// The full design matrix: per-segment feature rows plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMatrix {
    /// Per-segment feature rows
    pub segments: Vec<SegmentFeatures>,

    /// Names of the features that were computed
    pub feature_names: BTreeSet<String>,

    /// Validated temperature bin endpoints, when the bin feature ran
    pub bin_endpoints: Vec<f64>,
}

impl DesignMatrix {
    /// An empty design matrix (the unmatched-index failure result)
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            feature_names: BTreeSet::new(),
            bin_endpoints: Vec::new(),
        }
    }

    /// Whether a feature of the given name was computed
    pub fn has_feature(&self, name: &str) -> bool {
        self.feature_names.contains(name)
    }

    /// Total number of rows across all segments
    pub fn total_rows(&self) -> usize {
        self.segments.iter().map(|s| s.rows.len()).sum()
    }

    /// Whether the matrix holds no rows at all
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

/// Build the design matrix by running feature computers over every segment
///
/// Segments with an empty model id are reported through a missing-model-id
/// warning but still processed. A computer returning a value count that does
/// not match the segment's row count invalidates the whole matrix: the
/// result is an empty matrix plus an unmatched-index warning.
pub fn get_design_matrix(
    segmented: &SegmentedSeries,
    computers: &[&dyn FeatureComputer],
) -> (DesignMatrix, Vec<ModelWarning>) {
    let mut warnings = Vec::new();
    let mut matrix = DesignMatrix::empty();

    for (index, segment) in segmented.segments.iter().enumerate() {
        if segment.model_id.is_empty() {
            warn!("Segment {} carries no model id", index);
            warnings.push(ModelWarning::missing_model_id(index));
        }

        let mut rows: Vec<FeatureRow> = segment
            .observations
            .iter()
            .map(|row| FeatureRow::from_observation(*row))
            .collect();

        for computer in computers {
            let (values, mut computer_warnings) = computer.compute(segment);
            warnings.append(&mut computer_warnings);

            if values.len() != rows.len() {
                warn!(
                    "Feature '{}' returned {} values for {} rows in segment {}",
                    computer.name(),
                    values.len(),
                    rows.len(),
                    segment.model_id
                );
                warnings.push(ModelWarning::design_matrix_unmatched_index(
                    computer.name(),
                    rows.len(),
                    values.len(),
                ));
                return (DesignMatrix::empty(), warnings);
            }

            match values {
                FeatureValues::HourOfWeek(hours) => {
                    for (row, hour) in rows.iter_mut().zip(hours) {
                        row.hour_of_week = Some(hour);
                    }
                }
                FeatureValues::Occupancy(flags) => {
                    for (row, flag) in rows.iter_mut().zip(flags) {
                        row.occupied = Some(flag);
                    }
                }
                FeatureValues::TemperatureBins { endpoints, bases } => {
                    matrix.bin_endpoints = endpoints;
                    for (row, values) in rows.iter_mut().zip(bases) {
                        row.bin_values = values;
                    }
                }
            }
            matrix.feature_names.insert(computer.name().to_string());
        }

        matrix.segments.push(SegmentFeatures {
            model_id: segment.model_id.clone(),
            rows,
        });
    }

    debug!(
        "Design matrix: {} segments, {} rows, features {:?}",
        matrix.segments.len(),
        matrix.total_rows(),
        matrix.feature_names
    );

    (matrix, warnings)
}
