//! Non-fatal pipeline diagnostics
//!
//! Warnings carry a stable qualified name, a human-readable description, and
//! a structured JSON payload. They are collected alongside results at every
//! pipeline stage and never abort processing; errors are reserved for inputs
//! the pipeline cannot use at all.

use crate::app::models::ModelId;
use crate::constants::{BASELINE_WARNING_PREFIX, HOURLY_WARNING_PREFIX};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// A structured, non-fatal diagnostic emitted by the metering pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWarning {
    /// Stable dotted identifier, e.g. `caltrack.hourly.no_data`
    pub qualified_name: String,

    /// Human-readable description of the condition
    pub description: String,

    /// Structured payload with condition details
    pub data: serde_json::Value,
}

impl ModelWarning {
    /// Create a warning with an arbitrary qualified name and payload
    pub fn new(
        qualified_name: impl Into<String>,
        description: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            description: description.into(),
            data,
        }
    }

    // =========================================================================
    // Baseline selection warnings
    // =========================================================================

    /// No observations remain after baseline filtering
    pub fn empty_baseline() -> Self {
        Self::new(
            format!("{}.empty_baseline", BASELINE_WARNING_PREFIX),
            "No observations remain in the requested baseline period.",
            json!({}),
        )
    }

    /// The available data span is shorter than the requested baseline
    pub fn baseline_shorter_than_requested(requested_days: i64, actual_days: i64) -> Self {
        Self::new(
            format!(
                "{}.baseline_shorter_than_requested",
                BASELINE_WARNING_PREFIX
            ),
            format!(
                "Baseline data spans {} days, shorter than the requested {} days.",
                actual_days, requested_days
            ),
            json!({
                "requested_days": requested_days,
                "actual_days": actual_days,
            }),
        )
    }

    // =========================================================================
    // Segmentation warnings
    // =========================================================================

    /// One or more calendar months have no data at all, so their monthly
    /// models cannot be built
    pub fn incomplete_calendar_year_coverage(missing_months: &[u32]) -> Self {
        Self::new(
            format!(
                "{}.incomplete_calendar_year_coverage",
                HOURLY_WARNING_PREFIX
            ),
            format!(
                "Data does not cover full calendar year. {} Missing monthly models: {:?}",
                missing_months.len(),
                missing_months
            ),
            json!({
                "num_missing_months": missing_months.len(),
                "missing_months": missing_months,
            }),
        )
    }

    /// A month's hourly coverage falls below the sufficiency threshold
    pub fn insufficient_hourly_coverage(month: u32, hourly_coverage: f64) -> Self {
        Self::new(
            format!("{}.insufficient_hourly_coverage", HOURLY_WARNING_PREFIX),
            format!(
                "Data for this model does not meet the minimum hourly sufficiency criteria. \
                 Month {} coverage: {:.4}",
                month, hourly_coverage
            ),
            json!({
                "month": month,
                "hourly_coverage": hourly_coverage,
            }),
        )
    }

    // =========================================================================
    // Feature warnings
    // =========================================================================

    /// The data does not include all 168 hours of the week
    pub fn missing_hours_of_week(num_missing_hours: u32) -> Self {
        Self::new(
            format!("{}.missing_hours_of_week", HOURLY_WARNING_PREFIX),
            "Data does not include all hours of week.",
            json!({ "num_missing_hours": num_missing_hours }),
        )
    }

    /// A segment carries no model id
    pub fn missing_model_id(segment_index: usize) -> Self {
        Self::new(
            format!("{}.missing_model_id", HOURLY_WARNING_PREFIX),
            "Segment does not carry a model id; treating it as a single unlabeled segment.",
            json!({ "segment_index": segment_index }),
        )
    }

    /// The occupancy submodel could not be fit for a segment
    pub fn failed_occupancy_model(model_id: &ModelId, error: &str) -> Self {
        Self::new(
            format!("{}.failed_occupancy_model", HOURLY_WARNING_PREFIX),
            format!(
                "Error encountered in weighted least squares occupancy model for model id: {}",
                model_id
            ),
            json!({
                "model_id": model_id,
                "error": error,
            }),
        )
    }

    /// A temperature bin endpoint was dropped during validation
    pub fn dropped_temperature_bin(endpoint: f64, count_below: usize, count_above: usize) -> Self {
        Self::new(
            format!("{}.dropped_temperature_bin", HOURLY_WARNING_PREFIX),
            format!(
                "Temperature bin endpoint {} dropped: insufficient observations on one side.",
                endpoint
            ),
            json!({
                "endpoint": endpoint,
                "count_below": count_below,
                "count_above": count_above,
            }),
        )
    }

    /// A feature computer returned rows that do not align with the data
    pub fn design_matrix_unmatched_index(
        function: &str,
        expected_rows: usize,
        actual_rows: usize,
    ) -> Self {
        Self::new(
            format!("{}.design_matrix_unmatched_index", HOURLY_WARNING_PREFIX),
            format!(
                "Function returned a feature whose index does not match the data: {}",
                function
            ),
            json!({
                "function": function,
                "expected_rows": expected_rows,
                "actual_rows": actual_rows,
            }),
        )
    }

    // =========================================================================
    // Model fitting warnings
    // =========================================================================

    /// No data was available for fitting
    pub fn no_data() -> Self {
        Self::new(
            format!("{}.no_data", HOURLY_WARNING_PREFIX),
            "No data available. Cannot fit model.",
            json!({}),
        )
    }

    /// The design matrix lacks features the model requires
    pub fn missing_features(missing: &[&str]) -> Self {
        Self::new(
            format!("{}.missing_features", HOURLY_WARNING_PREFIX),
            "Data is missing features required by the model.",
            json!({ "missing_features": missing }),
        )
    }

    /// The consumption model could not be fit for a segment
    pub fn failed_consumption_model(model_id: &ModelId, error: &str) -> Self {
        Self::new(
            format!("{}.failed_consumption_model", HOURLY_WARNING_PREFIX),
            format!(
                "Error encountered in weighted least squares method for model id: {}",
                model_id
            ),
            json!({
                "model_id": model_id,
                "error": error,
            }),
        )
    }
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.qualified_name, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_calendar_year_coverage() {
        let warning = ModelWarning::incomplete_calendar_year_coverage(&[3, 4, 5, 6, 7]);
        assert_eq!(
            warning.qualified_name,
            "caltrack.hourly.incomplete_calendar_year_coverage"
        );
        assert_eq!(
            warning.description,
            "Data does not cover full calendar year. 5 Missing monthly models: [3, 4, 5, 6, 7]"
        );
        assert_eq!(warning.data["num_missing_months"], 5);
        assert_eq!(warning.data["missing_months"][0], 3);
    }

    #[test]
    fn test_insufficient_hourly_coverage() {
        let warning = ModelWarning::insufficient_hourly_coverage(2, 0.8215);
        assert_eq!(
            warning.qualified_name,
            "caltrack.hourly.insufficient_hourly_coverage"
        );
        assert!(warning.description.contains(
            "Data for this model does not meet the minimum hourly sufficiency criteria. Month 2"
        ));
        assert!((warning.data["hourly_coverage"].as_f64().unwrap() - 0.8215).abs() < 1e-12);
    }

    #[test]
    fn test_no_data() {
        let warning = ModelWarning::no_data();
        assert_eq!(warning.qualified_name, "caltrack.hourly.no_data");
        assert_eq!(warning.description, "No data available. Cannot fit model.");
        assert_eq!(warning.data, serde_json::json!({}));
    }

    #[test]
    fn test_missing_hours_of_week() {
        let warning = ModelWarning::missing_hours_of_week(48);
        assert_eq!(
            warning.description,
            "Data does not include all hours of week."
        );
        assert_eq!(warning.data["num_missing_hours"], 48);
    }

    #[test]
    fn test_failed_consumption_model_names_model_id() {
        let model_id = ModelId((1..=12).collect());
        let warning = ModelWarning::failed_consumption_model(&model_id, "singular system");
        assert!(warning.description.ends_with(
            "for model id: (1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)"
        ));
        assert_eq!(warning.data["error"], "singular system");
    }

    #[test]
    fn test_warning_serialization_round_trip() {
        let warning = ModelWarning::missing_features(&["hour_of_week"]);
        let encoded = serde_json::to_string(&warning).unwrap();
        let decoded: ModelWarning = serde_json::from_str(&encoded).unwrap();
        assert_eq!(warning, decoded);
    }
}
