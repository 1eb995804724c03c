//! Counterfactual prediction and metered savings
//!
//! A fitted hourly model predicts what usage would have been under
//! reporting-period temperatures. Savings are the difference between that
//! counterfactual and the observed reporting-period usage.

use super::hourly::HourlyModel;
use crate::app::models::{HourlyObservation, MeterReading, TemperatureReading};
use crate::{Error, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of a counterfactual prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPrediction {
    /// Predicted usage per input hour, in input order
    pub predictions: Vec<MeterReading>,

    /// Input hours skipped because no segment model covers their month
    pub skipped_rows: usize,
}

impl HourlyPrediction {
    /// Total predicted usage
    pub fn total(&self) -> f64 {
        self.predictions.iter().map(|p| p.value).sum()
    }
}

/// One hour of the savings calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsRow {
    /// Start of the hour
    pub start: chrono::DateTime<chrono::Utc>,

    /// Observed reporting-period usage
    pub observed: f64,

    /// Model counterfactual usage
    pub counterfactual: f64,

    /// Counterfactual minus observed
    pub savings: f64,
}

/// Aggregated metered savings over a reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    /// Hourly savings detail, in input order
    pub rows: Vec<SavingsRow>,

    /// Hours skipped because no segment model covers their month
    pub skipped_rows: usize,

    /// Total counterfactual usage
    pub counterfactual_total: f64,

    /// Total observed usage
    pub observed_total: f64,

    /// Total savings (counterfactual minus observed)
    pub total_savings: f64,

    /// Savings as a fraction of the counterfactual; omitted when the
    /// counterfactual total is zero
    pub percent_savings: Option<f64>,
}

impl HourlyModel {
    /// Predict counterfactual usage for a series of hourly temperatures
    ///
    /// Hours whose calendar month has no segment model are skipped and
    /// counted, not predicted.
    pub fn predict(&self, temperatures: &[TemperatureReading]) -> Result<HourlyPrediction> {
        if temperatures.is_empty() {
            return Err(Error::data_validation(
                "Cannot predict over an empty temperature series",
            ));
        }

        let mut predictions = Vec::with_capacity(temperatures.len());
        let mut skipped_rows = 0usize;

        for reading in temperatures {
            let month = reading.start.month();
            let Some(segment_model) = self.model_for_month(month) else {
                skipped_rows += 1;
                continue;
            };

            let observation = HourlyObservation {
                start: reading.start,
                meter_value: 0.0,
                temperature_mean: reading.temp_f,
            };
            let hour_of_week = observation.hour_of_week();
            let occupied = self.occupancy.as_ref().map(|lookup| {
                lookup.is_occupied(&segment_model.model_id, hour_of_week)
            });

            let value = segment_model.predict_hour(
                hour_of_week,
                reading.temp_f,
                occupied,
                &self.bin_endpoints,
            );
            predictions.push(MeterReading {
                start: reading.start,
                value,
            });
        }

        if skipped_rows > 0 {
            warn!(
                "Skipped {} of {} hours: no segment model for their months",
                skipped_rows,
                temperatures.len()
            );
        }
        debug!("Predicted {} hourly values", predictions.len());

        Ok(HourlyPrediction {
            predictions,
            skipped_rows,
        })
    }

    /// Compute metered savings over an observed reporting period
    ///
    /// The counterfactual is predicted from the reporting period's own
    /// temperatures; savings are counterfactual minus observed, hour by
    /// hour.
    pub fn metered_savings(&self, reporting: &[HourlyObservation]) -> Result<SavingsSummary> {
        if reporting.is_empty() {
            return Err(Error::data_validation(
                "Cannot compute savings over an empty reporting period",
            ));
        }

        let mut rows = Vec::with_capacity(reporting.len());
        let mut skipped_rows = 0usize;

        for observation in reporting {
            let month = observation.month();
            let Some(segment_model) = self.model_for_month(month) else {
                skipped_rows += 1;
                continue;
            };

            let hour_of_week = observation.hour_of_week();
            let occupied = self.occupancy.as_ref().map(|lookup| {
                lookup.is_occupied(&segment_model.model_id, hour_of_week)
            });
            let counterfactual = segment_model.predict_hour(
                hour_of_week,
                observation.temperature_mean,
                occupied,
                &self.bin_endpoints,
            );

            rows.push(SavingsRow {
                start: observation.start,
                observed: observation.meter_value,
                counterfactual,
                savings: counterfactual - observation.meter_value,
            });
        }

        let counterfactual_total: f64 = rows.iter().map(|r| r.counterfactual).sum();
        let observed_total: f64 = rows.iter().map(|r| r.observed).sum();
        let total_savings = counterfactual_total - observed_total;
        let percent_savings =
            (counterfactual_total != 0.0).then(|| total_savings / counterfactual_total);

        debug!(
            "Metered savings over {} hours: {:.3} ({} skipped)",
            rows.len(),
            total_savings,
            skipped_rows
        );

        Ok(SavingsSummary {
            rows,
            skipped_rows,
            counterfactual_total,
            observed_total,
            total_savings,
            percent_savings,
        })
    }
}
