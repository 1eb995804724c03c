//! Model fit metrics
//!
//! In-sample goodness-of-fit measures computed over observed and predicted
//! series: RMSE, CVRMSE, NMBE, and R-squared. Ratio metrics are omitted
//! when their denominators vanish.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Goodness-of-fit metrics for a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Number of observations the metrics cover
    pub n_obs: usize,

    /// Mean of the observed series
    pub observed_mean: f64,

    /// Mean of the predicted series
    pub predicted_mean: f64,

    /// Root mean squared error
    pub rmse: f64,

    /// Coefficient of variation of the RMSE; omitted when the observed
    /// mean is zero
    pub cvrmse: Option<f64>,

    /// Normalized mean bias error; omitted when the observed mean is zero
    pub nmbe: Option<f64>,

    /// R-squared; omitted when the observed series has no variance
    pub r_squared: Option<f64>,
}

impl ModelMetrics {
    /// Compute metrics over aligned observed and predicted series
    pub fn compute(observed: &[f64], predicted: &[f64]) -> Result<Self> {
        if observed.is_empty() {
            return Err(Error::data_validation(
                "Cannot compute metrics over an empty series",
            ));
        }
        if observed.len() != predicted.len() {
            return Err(Error::data_validation(format!(
                "Metrics series length mismatch: {} observed, {} predicted",
                observed.len(),
                predicted.len()
            )));
        }

        let n = observed.len() as f64;
        let observed_mean = observed.iter().sum::<f64>() / n;
        let predicted_mean = predicted.iter().sum::<f64>() / n;

        let sse: f64 = observed
            .iter()
            .zip(predicted)
            .map(|(o, p)| (o - p).powi(2))
            .sum();
        let rmse = (sse / n).sqrt();

        let bias: f64 = predicted
            .iter()
            .zip(observed)
            .map(|(p, o)| p - o)
            .sum::<f64>()
            / n;

        let sst: f64 = observed.iter().map(|o| (o - observed_mean).powi(2)).sum();

        let cvrmse = (observed_mean != 0.0).then(|| rmse / observed_mean);
        let nmbe = (observed_mean != 0.0).then(|| bias / observed_mean);
        let r_squared = (sst != 0.0).then(|| 1.0 - sse / sst);

        Ok(Self {
            n_obs: observed.len(),
            observed_mean,
            predicted_mean,
            rmse,
            cvrmse,
            nmbe,
            r_squared,
        })
    }
}
