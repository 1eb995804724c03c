//! CalTRACK hourly consumption models
//!
//! Fits one weighted least squares model per baseline segment. Each model
//! regresses hourly usage on hour-of-week intercepts plus piecewise-linear
//! temperature bin terms, optionally split by the occupancy indicator. The
//! fit result carries a status, the fitted per-segment term maps, collected
//! warnings, and in-sample metrics over each segment's primary rows.

use super::metrics::ModelMetrics;
use super::wls::fit_wls;
use crate::app::models::{ModelId, ModelWarning};
use crate::app::services::features::{
    DesignMatrix, FeatureComputer, HourOfWeekComputer, OccupancyComputer, OccupancyLookup,
    SegmentFeatures, TemperatureBinComputer, bin_bases, bin_labels, compute_occupancy,
    get_design_matrix,
};
use crate::app::services::segmentation::segment_timeseries_with_coverage;
use crate::config::ModelConfig;
use crate::constants::CALTRACK_HOURLY_METHOD_NAME;
use crate::{Error, HourlyObservation, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome status of an hourly model fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelStatus {
    /// At least one segment model was fit
    #[serde(rename = "SUCCESS")]
    Success,

    /// The design matrix held no rows
    #[serde(rename = "NO DATA")]
    NoData,

    /// The design matrix lacked required features
    #[serde(rename = "MISSING FEATURES")]
    MissingFeatures,

    /// Every segment model failed to fit
    #[serde(rename = "FAILED MODELS")]
    FailedModels,
}

impl ModelStatus {
    /// Status string reported in output and serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Success => "SUCCESS",
            ModelStatus::NoData => "NO DATA",
            ModelStatus::MissingFeatures => "MISSING FEATURES",
            ModelStatus::FailedModels => "FAILED MODELS",
        }
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One fitted segment model: a term-to-coefficient map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentModel {
    /// Months covered by this model
    pub model_id: ModelId,

    /// Fitted coefficient per design matrix term
    pub terms: BTreeMap<String, f64>,

    /// Weighted mean usage, the fallback for hours of week the segment
    /// never observed
    pub weighted_mean: f64,
}

impl SegmentModel {
    /// Predict usage for a single hour
    ///
    /// `occupied` should be `Some` when the model was fit with occupancy
    /// interactions; plain bin terms are used as a fallback either way.
    pub fn predict_hour(
        &self,
        hour_of_week: u32,
        temp_f: f64,
        occupied: Option<bool>,
        bin_endpoints: &[f64],
    ) -> f64 {
        let mut value = self
            .terms
            .get(&hour_term(hour_of_week))
            .copied()
            .unwrap_or(self.weighted_mean);

        let labels = bin_labels(bin_endpoints);
        let bases = bin_bases(temp_f, bin_endpoints);
        for (label, base) in labels.iter().zip(bases) {
            if base == 0.0 {
                continue;
            }
            let interacted = occupied.map(|flag| {
                if flag {
                    format!("{}_occupied", label)
                } else {
                    format!("{}_unoccupied", label)
                }
            });
            let coefficient = interacted
                .as_deref()
                .and_then(|name| self.terms.get(name))
                .or_else(|| self.terms.get(label.as_str()));
            if let Some(coefficient) = coefficient {
                value += coefficient * base;
            }
        }

        value
    }

    /// Number of fitted terms
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }
}

/// A fitted CalTRACK hourly model: per-segment term maps plus the shared
/// bin endpoints and occupancy lookup needed for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyModel {
    /// Fitted segment models in segment order
    pub segment_models: Vec<SegmentModel>,

    /// Temperature bin endpoints the models were fit over
    pub bin_endpoints: Vec<f64>,

    /// Occupancy lookup used during fitting, when interactions were enabled
    pub occupancy: Option<OccupancyLookup>,
}

impl HourlyModel {
    /// The segment model responsible for the given calendar month
    pub fn model_for_month(&self, month: u32) -> Option<&SegmentModel> {
        self.segment_models
            .iter()
            .find(|model| model.model_id.contains(month) || model.model_id.is_empty())
    }

    /// Months covered by at least one segment model
    pub fn covered_months(&self) -> Vec<u32> {
        (1..=12)
            .filter(|&month| self.model_for_month(month).is_some())
            .collect()
    }
}

/// Result of an hourly model fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    /// Outcome status
    pub status: ModelStatus,

    /// Fitting method identifier
    pub method_name: String,

    /// The fitted model, present on success
    pub model: Option<HourlyModel>,

    /// Warnings collected across all pipeline stages
    pub warnings: Vec<ModelWarning>,

    /// In-sample metrics over primary rows, present on success
    pub metrics: Option<ModelMetrics>,
}

impl ModelFit {
    fn with_status(status: ModelStatus, warnings: Vec<ModelWarning>) -> Self {
        Self {
            status,
            method_name: CALTRACK_HOURLY_METHOD_NAME.to_string(),
            model: None,
            warnings,
            metrics: None,
        }
    }
}

/// Design matrix term name for an hour-of-week intercept
pub fn hour_term(hour_of_week: u32) -> String {
    format!("hour_of_week_{:03}", hour_of_week)
}

/// Fit per-segment consumption models over a design matrix
///
/// `occupancy` is carried onto the resulting model so predictions can
/// reproduce the occupancy split; pass `None` when the matrix was built
/// without the occupancy feature.
pub fn fit_caltrack_hourly(matrix: &DesignMatrix, occupancy: Option<OccupancyLookup>) -> ModelFit {
    if matrix.is_empty() {
        return ModelFit::with_status(ModelStatus::NoData, vec![ModelWarning::no_data()]);
    }
    if !matrix.has_feature("hour_of_week") {
        return ModelFit::with_status(
            ModelStatus::MissingFeatures,
            vec![ModelWarning::missing_features(&["hour_of_week"])],
        );
    }

    let split_by_occupancy = matrix.has_feature("occupancy");
    let mut warnings = Vec::new();
    let mut segment_models = Vec::new();

    for segment in &matrix.segments {
        match fit_segment(segment, &matrix.bin_endpoints, split_by_occupancy) {
            Ok(model) => {
                debug!(
                    "Fit segment {} with {} terms",
                    model.model_id,
                    model.num_terms()
                );
                segment_models.push(model);
            }
            Err(error) => {
                warn!("Segment {} model failed: {}", segment.model_id, error);
                warnings.push(ModelWarning::failed_consumption_model(
                    &segment.model_id,
                    &error.to_string(),
                ));
            }
        }
    }

    if segment_models.is_empty() {
        return ModelFit::with_status(ModelStatus::FailedModels, warnings);
    }

    let model = HourlyModel {
        segment_models,
        bin_endpoints: matrix.bin_endpoints.clone(),
        occupancy,
    };
    let metrics = in_sample_metrics(&model, matrix);

    ModelFit {
        status: ModelStatus::Success,
        method_name: CALTRACK_HOURLY_METHOD_NAME.to_string(),
        model: Some(model),
        warnings,
        metrics,
    }
}

/// Fit one segment's weighted least squares model
fn fit_segment(
    segment: &SegmentFeatures,
    bin_endpoints: &[f64],
    split_by_occupancy: bool,
) -> Result<SegmentModel> {
    if segment.rows.is_empty() {
        return Err(Error::model_fitting("Segment holds no rows"));
    }

    // Hour-of-week intercepts for the hours this segment observed
    let mut hours: Vec<u32> = segment
        .rows
        .iter()
        .map(|row| {
            row.hour_of_week
                .ok_or_else(|| Error::model_fitting("Row is missing its hour-of-week feature"))
        })
        .collect::<Result<Vec<u32>>>()?;
    hours.sort_unstable();
    hours.dedup();

    let labels = bin_labels(bin_endpoints);
    let mut names: Vec<String> = hours.iter().map(|h| hour_term(*h)).collect();
    if split_by_occupancy {
        for label in &labels {
            names.push(format!("{}_occupied", label));
            names.push(format!("{}_unoccupied", label));
        }
    } else {
        names.extend(labels.iter().cloned());
    }

    let hour_count = hours.len();
    let mut design: Vec<Vec<f64>> = Vec::with_capacity(segment.rows.len());
    let mut response: Vec<f64> = Vec::with_capacity(segment.rows.len());
    let mut weights: Vec<f64> = Vec::with_capacity(segment.rows.len());
    let mut row_hours: Vec<usize> = Vec::with_capacity(segment.rows.len());

    for row in &segment.rows {
        let mut x = vec![0.0; names.len()];

        let hour = row
            .hour_of_week
            .ok_or_else(|| Error::model_fitting("Row is missing its hour-of-week feature"))?;
        let hour_index = hours
            .binary_search(&hour)
            .map_err(|_| Error::model_fitting(format!("Hour of week {} not indexed", hour)))?;
        x[hour_index] = 1.0;
        row_hours.push(hour_index);

        for (i, basis) in row.bin_values.iter().enumerate() {
            if split_by_occupancy {
                let occupied = row.occupied.unwrap_or(false);
                let column = hour_count + i * 2 + usize::from(!occupied);
                x[column] = *basis;
            } else {
                x[hour_count + i] = *basis;
            }
        }

        design.push(x);
        response.push(row.row.observation.meter_value);
        weights.push(row.row.weight);
    }

    // Hour intercepts need positively weighted support; a bin column that
    // is constant within every hour-of-week class (all zero, or saturated
    // across a segment warmer than its interval) lies in the span of the
    // hour intercepts and would make the system singular.
    let keep: Vec<bool> = (0..names.len())
        .map(|j| {
            if j < hour_count {
                design
                    .iter()
                    .zip(&weights)
                    .any(|(x, w)| x[j] != 0.0 && *w > 0.0)
            } else {
                !constant_within_hours(j, &design, &weights, &row_hours, hour_count)
            }
        })
        .collect();
    let kept_names: Vec<String> = names
        .into_iter()
        .zip(&keep)
        .filter(|(_, kept)| **kept)
        .map(|(name, _)| name)
        .collect();
    let design: Vec<Vec<f64>> = design
        .into_iter()
        .map(|x| {
            x.into_iter()
                .zip(&keep)
                .filter(|(_, kept)| **kept)
                .map(|(value, _)| value)
                .collect()
        })
        .collect();

    let fit = fit_wls(&design, &response, &weights)?;

    let weight_total: f64 = weights.iter().sum();
    if weight_total <= 0.0 {
        return Err(Error::model_fitting("Segment weights sum to zero"));
    }
    let weighted_mean = response
        .iter()
        .zip(&weights)
        .map(|(y, w)| y * w)
        .sum::<f64>()
        / weight_total;

    Ok(SegmentModel {
        model_id: segment.model_id.clone(),
        terms: kept_names.into_iter().zip(fit.coefficients).collect(),
        weighted_mean,
    })
}

/// Whether a design matrix column takes a single value within each
/// hour-of-week class, considering only positively weighted rows
fn constant_within_hours(
    column: usize,
    design: &[Vec<f64>],
    weights: &[f64],
    row_hours: &[usize],
    hour_count: usize,
) -> bool {
    let mut seen: Vec<Option<f64>> = vec![None; hour_count];
    for ((x, &weight), &hour_index) in design.iter().zip(weights).zip(row_hours) {
        if weight <= 0.0 {
            continue;
        }
        match seen[hour_index] {
            None => seen[hour_index] = Some(x[column]),
            Some(value) if value == x[column] => {}
            Some(_) => return false,
        }
    }
    true
}

/// In-sample metrics over the primary rows of every fitted segment
fn in_sample_metrics(model: &HourlyModel, matrix: &DesignMatrix) -> Option<ModelMetrics> {
    let mut observed = Vec::new();
    let mut predicted = Vec::new();

    for segment in &matrix.segments {
        let Some(segment_model) = model
            .segment_models
            .iter()
            .find(|m| m.model_id == segment.model_id)
        else {
            continue;
        };

        for row in &segment.rows {
            let month = row.row.observation.month();
            if !(segment.model_id.is_empty() || segment.model_id.contains(month)) {
                continue;
            }
            let Some(hour) = row.hour_of_week else {
                continue;
            };
            observed.push(row.row.observation.meter_value);
            predicted.push(segment_model.predict_hour(
                hour,
                row.row.observation.temperature_mean,
                row.occupied,
                &model.bin_endpoints,
            ));
        }
    }

    ModelMetrics::compute(&observed, &predicted).ok()
}

/// Run the full hourly fitting pipeline over a baseline period
///
/// Segments the baseline, validates temperature bins, fits occupancy
/// submodels when interactions are enabled, assembles the design matrix,
/// and fits the per-segment consumption models. Warnings from every stage
/// are collected onto the returned fit in stage order.
pub fn fit_hourly_model(baseline: &[HourlyObservation], config: &ModelConfig) -> Result<ModelFit> {
    config.validate()?;

    let (segmented, mut warnings) = segment_timeseries_with_coverage(
        baseline,
        config.segment_type,
        config.min_hourly_coverage,
    );

    let temperatures: Vec<f64> = baseline.iter().map(|obs| obs.temperature_mean).collect();
    let (bins, bin_warnings) =
        TemperatureBinComputer::validated(&temperatures, &config.temperature_bin_endpoints);
    warnings.extend(bin_warnings);

    let occupancy = if config.include_occupancy_interactions {
        let (lookup, occupancy_warnings) =
            compute_occupancy(&segmented, config.occupancy_threshold);
        warnings.extend(occupancy_warnings);
        Some(lookup)
    } else {
        None
    };

    let hour_of_week = HourOfWeekComputer;
    let occupancy_computer = occupancy.clone().map(OccupancyComputer::new);
    let mut computers: Vec<&dyn FeatureComputer> = vec![&hour_of_week];
    if let Some(computer) = &occupancy_computer {
        computers.push(computer);
    }
    if !bins.endpoints.is_empty() {
        computers.push(&bins);
    }

    let (matrix, design_warnings) = get_design_matrix(&segmented, &computers);
    warnings.extend(design_warnings);

    let mut fit = fit_caltrack_hourly(&matrix, occupancy);
    warnings.append(&mut fit.warnings);
    fit.warnings = warnings;

    info!(
        "Hourly model fit: status {}, {} segment models, {} warnings",
        fit.status,
        fit.model
            .as_ref()
            .map(|m| m.segment_models.len())
            .unwrap_or(0),
        fit.warnings.len()
    );

    Ok(fit)
}
