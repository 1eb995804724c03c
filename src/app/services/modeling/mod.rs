//! Consumption model fitting and prediction
//!
//! The weighted least squares machinery, the CalTRACK hourly fit, fit
//! metrics, and counterfactual prediction.

pub mod hourly;
pub mod metrics;
pub mod prediction;
pub mod wls;

#[cfg(test)]
pub mod tests;

pub use hourly::{
    HourlyModel, ModelFit, ModelStatus, SegmentModel, fit_caltrack_hourly, fit_hourly_model,
    hour_term,
};
pub use metrics::ModelMetrics;
pub use prediction::{HourlyPrediction, SavingsRow, SavingsSummary};
pub use wls::{WlsFit, fit_wls, solve_linear_system};
