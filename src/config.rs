//! Configuration for the metering pipeline.
//!
//! Provides the model configuration structure with defaults drawn from
//! [`crate::constants`] and builder-style setters for programmatic use.

use crate::app::services::segmentation::SegmentType;
use crate::constants::{
    DEFAULT_BASELINE_MAX_DAYS, DEFAULT_OCCUPANCY_THRESHOLD, DEFAULT_TEMPERATURE_BIN_ENDPOINTS,
    MIN_HOURLY_COVERAGE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for baseline selection, segmentation, and model fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Segmentation scheme applied to the baseline period
    pub segment_type: SegmentType,

    /// Maximum baseline length in days, counted back from the baseline end
    pub baseline_max_days: i64,

    /// Fraction of positive residuals above which an hour-of-week is
    /// considered occupied
    pub occupancy_threshold: f64,

    /// Minimum fraction of a month's hours that must carry data
    pub min_hourly_coverage: f64,

    /// Temperature bin endpoints (deg F), ascending
    pub temperature_bin_endpoints: Vec<f64>,

    /// Include occupancy-by-temperature-bin interaction terms in the
    /// consumption model when an occupancy feature is available
    pub include_occupancy_interactions: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            segment_type: SegmentType::ThreeMonthWeighted,
            baseline_max_days: DEFAULT_BASELINE_MAX_DAYS,
            occupancy_threshold: DEFAULT_OCCUPANCY_THRESHOLD,
            min_hourly_coverage: MIN_HOURLY_COVERAGE,
            temperature_bin_endpoints: DEFAULT_TEMPERATURE_BIN_ENDPOINTS.to_vec(),
            include_occupancy_interactions: true,
        }
    }
}

impl ModelConfig {
    /// Set the segmentation scheme
    pub fn with_segment_type(mut self, segment_type: SegmentType) -> Self {
        self.segment_type = segment_type;
        self
    }

    /// Set the maximum baseline length in days
    pub fn with_baseline_max_days(mut self, max_days: i64) -> Self {
        self.baseline_max_days = max_days;
        self
    }

    /// Set the occupancy threshold
    pub fn with_occupancy_threshold(mut self, threshold: f64) -> Self {
        self.occupancy_threshold = threshold;
        self
    }

    /// Set the minimum hourly coverage fraction
    pub fn with_min_hourly_coverage(mut self, coverage: f64) -> Self {
        self.min_hourly_coverage = coverage;
        self
    }

    /// Set the temperature bin endpoints
    pub fn with_temperature_bin_endpoints(mut self, endpoints: Vec<f64>) -> Self {
        self.temperature_bin_endpoints = endpoints;
        self
    }

    /// Disable occupancy-by-temperature-bin interaction terms
    pub fn without_occupancy_interactions(mut self) -> Self {
        self.include_occupancy_interactions = false;
        self
    }

    /// Validate configuration values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.baseline_max_days <= 0 {
            return Err(Error::configuration(
                "Baseline max days must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.occupancy_threshold) {
            return Err(Error::configuration(format!(
                "Occupancy threshold {} must be between 0 and 1",
                self.occupancy_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.min_hourly_coverage) {
            return Err(Error::configuration(format!(
                "Minimum hourly coverage {} must be between 0 and 1",
                self.min_hourly_coverage
            )));
        }

        if self.temperature_bin_endpoints.is_empty() {
            return Err(Error::configuration(
                "Temperature bin endpoints cannot be empty".to_string(),
            ));
        }

        if self
            .temperature_bin_endpoints
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            return Err(Error::configuration(
                "Temperature bin endpoints must be strictly ascending".to_string(),
            ));
        }

        Ok(())
    }
}
