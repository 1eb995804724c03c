//! Baseline segmentation into calendar-month models
//!
//! Splits a baseline observation series into per-month segments following
//! the CalTRACK hourly method. Each segment carries a [`ModelId`] naming the
//! months it covers and a weight per observation; the weighted rows feed the
//! per-segment consumption models.
//!
//! Segmentation schemes:
//! - `single`: one segment covering every observed month, weight 1
//! - `one_month`: one segment per observed month, weight 1
//! - `three_month`: per month, the month plus both neighbors, weight 1
//! - `three_month_weighted`: per month, the month at weight 1 and both
//!   neighbors at weight 0.5
//!
//! Monthly segments are identified by their central month; the `single`
//! scheme's one segment is identified by every month it covers.
//!
//! Months entirely absent from the data produce no segment and are reported
//! through a single incomplete-calendar-year warning; months whose hourly
//! coverage falls below the sufficiency threshold keep their segment but are
//! reported individually.

pub mod coverage;

#[cfg(test)]
pub mod tests;

pub use coverage::{hourly_coverage_by_month, missing_months};

use crate::app::models::{HourlyObservation, ModelId, ModelWarning, WeightedObservation};
use crate::constants::{
    MIN_HOURLY_COVERAGE, SEGMENT_ADJACENT_WEIGHT, SEGMENT_PRIMARY_WEIGHT, wrap_month,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Segmentation scheme applied to the baseline period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// One segment covering the whole baseline
    Single,
    /// One segment per calendar month
    OneMonth,
    /// One segment per calendar month, including both neighboring months
    ThreeMonth,
    /// One segment per calendar month, neighbors down-weighted to 0.5
    ThreeMonthWeighted,
}

impl SegmentType {
    /// Canonical name used in CLI arguments and serialized configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Single => "single",
            SegmentType::OneMonth => "one_month",
            SegmentType::ThreeMonth => "three_month",
            SegmentType::ThreeMonthWeighted => "three_month_weighted",
        }
    }
}

impl FromStr for SegmentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "single" => Ok(SegmentType::Single),
            "one_month" => Ok(SegmentType::OneMonth),
            "three_month" => Ok(SegmentType::ThreeMonth),
            "three_month_weighted" => Ok(SegmentType::ThreeMonthWeighted),
            other => Err(Error::invalid_segment_type(other)),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One segment of the baseline: a model id plus weighted observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Months covered by this segment's model
    pub model_id: ModelId,

    /// Weighted observations assigned to this segment
    pub observations: Vec<WeightedObservation>,
}

impl Segment {
    /// Create a segment from a model id and weighted observations
    pub fn new(model_id: ModelId, observations: Vec<WeightedObservation>) -> Self {
        Self {
            model_id,
            observations,
        }
    }

    /// Number of observations in the segment
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the segment holds no observations
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sum of meter values over rows whose month belongs to the model id
    pub fn primary_meter_total(&self) -> f64 {
        self.observations
            .iter()
            .filter(|row| self.model_id.contains(row.observation.month()))
            .map(|row| row.observation.meter_value)
            .sum()
    }
}

/// A segmented baseline series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedSeries {
    /// Segmentation scheme that produced the series
    pub segment_type: SegmentType,

    /// Segments in ascending order of central month
    pub segments: Vec<Segment>,
}

impl SegmentedSeries {
    /// Total number of weighted rows across all segments
    pub fn total_rows(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Model ids of all segments
    pub fn model_ids(&self) -> Vec<&ModelId> {
        self.segments.iter().map(|s| &s.model_id).collect()
    }

    /// Wrap a plain observation series as a single unlabeled segment
    ///
    /// Used by feature computers that accept unsegmented input; the missing
    /// model id is reported by the computer, not here.
    pub fn from_unsegmented(observations: &[HourlyObservation]) -> Self {
        let rows = observations
            .iter()
            .map(|obs| WeightedObservation::new(*obs, SEGMENT_PRIMARY_WEIGHT))
            .collect();
        Self {
            segment_type: SegmentType::Single,
            segments: vec![Segment::new(ModelId(vec![]), rows)],
        }
    }
}

/// Segment a baseline observation series
///
/// Returns the segmented series along with coverage warnings: one warning
/// per month model whose central month's hourly coverage falls below
/// [`MIN_HOURLY_COVERAGE`], and a final incomplete-calendar-year warning
/// when any months carry no data at all.
pub fn segment_timeseries(
    observations: &[HourlyObservation],
    segment_type: SegmentType,
) -> (SegmentedSeries, Vec<ModelWarning>) {
    segment_timeseries_with_coverage(observations, segment_type, MIN_HOURLY_COVERAGE)
}

/// [`segment_timeseries`] with a caller-supplied coverage threshold
pub fn segment_timeseries_with_coverage(
    observations: &[HourlyObservation],
    segment_type: SegmentType,
    min_hourly_coverage: f64,
) -> (SegmentedSeries, Vec<ModelWarning>) {
    let mut warnings = Vec::new();

    let observed_months: BTreeSet<u32> = observations.iter().map(|obs| obs.month()).collect();
    let coverage = hourly_coverage_by_month(observations);

    let segments = match segment_type {
        SegmentType::Single => build_single_segment(observations, &observed_months),
        SegmentType::OneMonth => build_month_segments(observations, &observed_months, 0, 1.0),
        SegmentType::ThreeMonth => {
            build_month_segments(observations, &observed_months, 1, SEGMENT_PRIMARY_WEIGHT)
        }
        SegmentType::ThreeMonthWeighted => {
            build_month_segments(observations, &observed_months, 1, SEGMENT_ADJACENT_WEIGHT)
        }
    };

    // Per-month sufficiency warnings apply to the monthly schemes only; a
    // single whole-baseline model has no central month to check.
    if segment_type != SegmentType::Single {
        for &month in &observed_months {
            if let Some(&month_coverage) = coverage.get(&month) {
                if month_coverage < min_hourly_coverage {
                    warn!(
                        "Month {} hourly coverage {:.4} below sufficiency threshold",
                        month, month_coverage
                    );
                    warnings.push(ModelWarning::insufficient_hourly_coverage(
                        month,
                        month_coverage,
                    ));
                }
            }
        }
    }

    let missing = missing_months(&observed_months);
    if !missing.is_empty() && !observations.is_empty() {
        warn!("Missing monthly models for months {:?}", missing);
        warnings.push(ModelWarning::incomplete_calendar_year_coverage(&missing));
    }

    debug!(
        "Segmented {} observations into {} segments ({} rows, scheme {})",
        observations.len(),
        segments.len(),
        segments.iter().map(Segment::len).sum::<usize>(),
        segment_type
    );

    (
        SegmentedSeries {
            segment_type,
            segments,
        },
        warnings,
    )
}

/// Build the single whole-baseline segment
fn build_single_segment(
    observations: &[HourlyObservation],
    observed_months: &BTreeSet<u32>,
) -> Vec<Segment> {
    if observations.is_empty() {
        return Vec::new();
    }

    let model_id = ModelId(observed_months.iter().copied().collect());
    let rows = observations
        .iter()
        .map(|obs| WeightedObservation::new(*obs, SEGMENT_PRIMARY_WEIGHT))
        .collect();
    vec![Segment::new(model_id, rows)]
}

/// Build one segment per observed month
///
/// `reach` is the number of neighboring months included on each side, and
/// `neighbor_weight` the weight applied to their rows. The model id names
/// the central month only; neighbors contribute rows, not identity.
fn build_month_segments(
    observations: &[HourlyObservation],
    observed_months: &BTreeSet<u32>,
    reach: i32,
    neighbor_weight: f64,
) -> Vec<Segment> {
    let mut segments = Vec::new();

    for &month in observed_months {
        let included: Vec<u32> = (-reach..=reach)
            .map(|offset| wrap_month(month as i32 + offset))
            .collect();

        let model_id = ModelId::single_month(month);

        let rows: Vec<WeightedObservation> = observations
            .iter()
            .filter(|obs| included.contains(&obs.month()))
            .map(|obs| {
                let weight = if obs.month() == month {
                    SEGMENT_PRIMARY_WEIGHT
                } else {
                    neighbor_weight
                };
                WeightedObservation::new(*obs, weight)
            })
            .collect();

        segments.push(Segment::new(model_id, rows));
    }

    segments
}
