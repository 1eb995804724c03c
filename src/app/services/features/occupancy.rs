//! Occupancy feature
//!
//! For each segment, a weighted least squares degree-day model
//! (`usage ~ 1 + cdd_65 + hdd_50`) is fit over the segment's rows. Hours of
//! the week whose residuals are positive more often than the occupancy
//! threshold are marked occupied: usage above the weather-explained level in
//! most weeks indicates someone is there. The resulting lookup holds one
//! entry per hour of week per segment.

use super::{FeatureComputer, FeatureValues};
use crate::app::models::{ModelId, ModelWarning};
use crate::app::services::modeling::wls::fit_wls;
use crate::app::services::segmentation::{Segment, SegmentedSeries};
use crate::app::services::temperature::{cooling_degrees, heating_degrees};
use crate::constants::{
    HOURS_PER_WEEK, OCCUPANCY_COOLING_BALANCE_POINT_F, OCCUPANCY_HEATING_BALANCE_POINT_F,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Occupancy classification for one segment: an entry per hour of week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOccupancy {
    /// Months covered by the segment's model
    pub model_id: ModelId,

    /// Occupancy flag per hour of week, indexed by `hour_of_week - 1`
    pub occupied: Vec<bool>,
}

impl SegmentOccupancy {
    /// Whether the given hour of week (1..=168) is occupied
    pub fn is_occupied(&self, hour_of_week: u32) -> bool {
        hour_of_week >= 1
            && self
                .occupied
                .get((hour_of_week - 1) as usize)
                .copied()
                .unwrap_or(false)
    }

    /// Number of occupied hours of the week
    pub fn occupied_hours(&self) -> usize {
        self.occupied.iter().filter(|flag| **flag).count()
    }
}

/// Per-segment occupancy lookup produced by the occupancy submodels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyLookup {
    /// Threshold on the positive-residual fraction
    pub threshold: f64,

    /// One entry per segment whose submodel fit succeeded
    pub segments: Vec<SegmentOccupancy>,
}

impl OccupancyLookup {
    /// The occupancy entry for a segment, if its submodel fit succeeded
    pub fn segment(&self, model_id: &ModelId) -> Option<&SegmentOccupancy> {
        self.segments.iter().find(|s| &s.model_id == model_id)
    }

    /// Whether the given hour of week is occupied in the given segment
    ///
    /// Hours and segments without an entry are treated as unoccupied.
    pub fn is_occupied(&self, model_id: &ModelId, hour_of_week: u32) -> bool {
        self.segment(model_id)
            .map(|s| s.is_occupied(hour_of_week))
            .unwrap_or(false)
    }
}

/// Fit occupancy submodels over every segment of a segmented series
///
/// Segments whose degree-day model cannot be fit are omitted from the lookup
/// and reported through a failed-occupancy-model warning.
pub fn compute_occupancy(
    segmented: &SegmentedSeries,
    threshold: f64,
) -> (OccupancyLookup, Vec<ModelWarning>) {
    let mut warnings = Vec::new();
    let mut segments = Vec::new();

    for segment in &segmented.segments {
        match fit_segment_occupancy(segment, threshold) {
            Ok(occupancy) => {
                debug!(
                    "Occupancy for segment {}: {} of {} hours occupied",
                    segment.model_id,
                    occupancy.occupied_hours(),
                    HOURS_PER_WEEK
                );
                segments.push(occupancy);
            }
            Err(error) => {
                warn!(
                    "Occupancy submodel failed for segment {}: {}",
                    segment.model_id, error
                );
                warnings.push(ModelWarning::failed_occupancy_model(
                    &segment.model_id,
                    &error.to_string(),
                ));
            }
        }
    }

    (
        OccupancyLookup {
            threshold,
            segments,
        },
        warnings,
    )
}

/// Fit one segment's degree-day submodel and threshold its residuals
fn fit_segment_occupancy(segment: &Segment, threshold: f64) -> crate::Result<SegmentOccupancy> {
    let design: Vec<Vec<f64>> = segment
        .observations
        .iter()
        .map(|row| {
            let temp = row.observation.temperature_mean;
            vec![
                1.0,
                cooling_degrees(temp, OCCUPANCY_COOLING_BALANCE_POINT_F),
                heating_degrees(temp, OCCUPANCY_HEATING_BALANCE_POINT_F),
            ]
        })
        .collect();
    let response: Vec<f64> = segment
        .observations
        .iter()
        .map(|row| row.observation.meter_value)
        .collect();
    let weights: Vec<f64> = segment.observations.iter().map(|row| row.weight).collect();

    let fit = fit_wls(&design, &response, &weights)?;

    // Per hour of week, the fraction of residuals above zero
    let mut positive = vec![0usize; HOURS_PER_WEEK as usize];
    let mut total = vec![0usize; HOURS_PER_WEEK as usize];
    for (row, residual) in segment.observations.iter().zip(&fit.residuals) {
        let index = (row.observation.hour_of_week() - 1) as usize;
        total[index] += 1;
        if *residual > 0.0 {
            positive[index] += 1;
        }
    }

    let occupied = positive
        .iter()
        .zip(&total)
        .map(|(&pos, &count)| count > 0 && pos as f64 / count as f64 > threshold)
        .collect();

    Ok(SegmentOccupancy {
        model_id: segment.model_id.clone(),
        occupied,
    })
}

/// Annotates segment rows with occupancy flags from a precomputed lookup
#[derive(Debug, Clone)]
pub struct OccupancyComputer {
    /// Lookup produced by [`compute_occupancy`]
    pub lookup: OccupancyLookup,
}

impl OccupancyComputer {
    /// Create a computer over a precomputed lookup
    pub fn new(lookup: OccupancyLookup) -> Self {
        Self { lookup }
    }
}

impl FeatureComputer for OccupancyComputer {
    fn name(&self) -> &'static str {
        "occupancy"
    }

    fn compute(&self, segment: &Segment) -> (FeatureValues, Vec<ModelWarning>) {
        let flags: Vec<bool> = segment
            .observations
            .iter()
            .map(|row| {
                self.lookup
                    .is_occupied(&segment.model_id, row.observation.hour_of_week())
            })
            .collect();

        (FeatureValues::Occupancy(flags), Vec::new())
    }
}
