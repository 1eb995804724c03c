//! Temperature bin feature
//!
//! Temperature enters the consumption models as a piecewise-linear basis
//! over a set of bin endpoints: one basis per interior interval capturing
//! the temperature rise within it, plus an overflow basis above the last
//! endpoint. Rise below the first endpoint is absorbed by the hour-of-week
//! intercepts. Endpoints whose neighboring bins hold too few observations
//! are dropped before fitting, since a basis without data on both sides
//! degenerates into a constant column.

use super::{FeatureComputer, FeatureValues};
use crate::app::models::ModelWarning;
use crate::app::services::segmentation::Segment;
use crate::constants::MIN_TEMPERATURE_BIN_COUNT;
use tracing::{debug, warn};

/// Drop bin endpoints whose neighboring bins are underpopulated
///
/// Bins are the intervals between consecutive endpoints, plus the open
/// intervals below the first and above the last. While any bin holds fewer
/// than `min_count` observations, the endpoint between it and its lower
/// neighbor is dropped (the first endpoint for the lowest bin) and the bins
/// merge. Each drop is reported through a warning.
pub fn validate_temperature_bins(
    temperatures: &[f64],
    endpoints: &[f64],
    min_count: usize,
) -> (Vec<f64>, Vec<ModelWarning>) {
    let mut kept: Vec<f64> = endpoints.to_vec();
    kept.sort_by(f64::total_cmp);
    kept.dedup();

    let mut warnings = Vec::new();

    loop {
        if kept.is_empty() {
            break;
        }

        let counts = bin_counts(temperatures, &kept);
        let Some(sparse_bin) = counts.iter().position(|&count| count < min_count) else {
            break;
        };

        // Merge the sparse bin downward; the lowest bin merges upward
        let drop_index = sparse_bin.saturating_sub(1);
        let endpoint = kept.remove(drop_index);

        let count_below = temperatures.iter().filter(|&&t| t <= endpoint).count();
        let count_above = temperatures.len() - count_below;
        warn!(
            "Dropping temperature bin endpoint {} ({} below, {} above)",
            endpoint, count_below, count_above
        );
        warnings.push(ModelWarning::dropped_temperature_bin(
            endpoint,
            count_below,
            count_above,
        ));
    }

    debug!(
        "Validated temperature bins: kept {:?} of {:?}",
        kept, endpoints
    );

    (kept, warnings)
}

/// Observation counts per bin: below the first endpoint, between each
/// consecutive pair, and above the last
fn bin_counts(temperatures: &[f64], endpoints: &[f64]) -> Vec<usize> {
    let mut counts = vec![0usize; endpoints.len() + 1];
    for &temp in temperatures {
        let bin = endpoints.iter().filter(|&&e| temp > e).count();
        counts[bin] += 1;
    }
    counts
}

/// Piecewise-linear basis values for a temperature over the given endpoints
///
/// Returns one value per interior interval (the rise within it, saturating
/// at the interval width) plus the overflow above the last endpoint. Empty
/// endpoints produce an empty basis.
pub fn bin_bases(temp_f: f64, endpoints: &[f64]) -> Vec<f64> {
    if endpoints.is_empty() {
        return Vec::new();
    }

    let mut bases = Vec::with_capacity(endpoints.len());
    for pair in endpoints.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        bases.push((temp_f.clamp(lo, hi) - lo).max(0.0));
    }
    // Last endpoint guaranteed present by the emptiness check above
    let last = endpoints[endpoints.len() - 1];
    bases.push((temp_f - last).max(0.0));

    bases
}

/// Term labels matching [`bin_bases`] positionally
pub fn bin_labels(endpoints: &[f64]) -> Vec<String> {
    if endpoints.is_empty() {
        return Vec::new();
    }

    let mut labels = Vec::with_capacity(endpoints.len());
    for pair in endpoints.windows(2) {
        labels.push(format!(
            "bin_{}_{}",
            endpoint_label(pair[0]),
            endpoint_label(pair[1])
        ));
    }
    let last = endpoints[endpoints.len() - 1];
    labels.push(format!("bin_gt{}", endpoint_label(last)));

    labels
}

/// Compact endpoint rendering for term labels: integral values print as
/// integers
fn endpoint_label(endpoint: f64) -> String {
    if endpoint.fract() == 0.0 {
        format!("{}", endpoint as i64)
    } else {
        format!("{}", endpoint)
    }
}

/// Annotates segment rows with piecewise-linear temperature bin bases
#[derive(Debug, Clone)]
pub struct TemperatureBinComputer {
    /// Validated bin endpoints, ascending
    pub endpoints: Vec<f64>,
}

impl TemperatureBinComputer {
    /// Create a computer over validated endpoints
    pub fn new(endpoints: Vec<f64>) -> Self {
        Self { endpoints }
    }

    /// Validate default-or-configured endpoints against the observed
    /// temperatures and build a computer over the survivors
    pub fn validated(
        temperatures: &[f64],
        endpoints: &[f64],
    ) -> (Self, Vec<ModelWarning>) {
        let (kept, warnings) =
            validate_temperature_bins(temperatures, endpoints, MIN_TEMPERATURE_BIN_COUNT);
        (Self::new(kept), warnings)
    }
}

impl FeatureComputer for TemperatureBinComputer {
    fn name(&self) -> &'static str {
        "temperature_bins"
    }

    fn compute(&self, segment: &Segment) -> (FeatureValues, Vec<ModelWarning>) {
        let bases: Vec<Vec<f64>> = segment
            .observations
            .iter()
            .map(|row| bin_bases(row.observation.temperature_mean, &self.endpoints))
            .collect();

        (
            FeatureValues::TemperatureBins {
                endpoints: self.endpoints.clone(),
                bases,
            },
            Vec::new(),
        )
    }
}
