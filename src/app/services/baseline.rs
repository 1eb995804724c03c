//! Baseline period selection
//!
//! Filters a merged observation series down to the baseline window used for
//! model fitting: up to `max_days` of data counted back from a chosen end
//! timestamp.

use crate::app::models::{HourlyObservation, ModelWarning};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Select baseline observations ending at `end` and reaching back at most
/// `max_days`
///
/// The window is `[end - max_days, end]`, inclusive at both endpoints: a
/// 365-day window over a year of hourly data keeps 8761 rows. Returns the
/// retained observations together with any baseline warnings.
pub fn get_baseline_data(
    observations: &[HourlyObservation],
    end: DateTime<Utc>,
    max_days: i64,
) -> (Vec<HourlyObservation>, Vec<ModelWarning>) {
    let mut warnings = Vec::new();
    let window_start = end - Duration::days(max_days);

    let baseline: Vec<HourlyObservation> = observations
        .iter()
        .filter(|obs| obs.start >= window_start && obs.start <= end)
        .copied()
        .collect();

    if baseline.is_empty() {
        warn!("No observations remain in the requested baseline period");
        warnings.push(ModelWarning::empty_baseline());
        return (baseline, warnings);
    }

    if let (Some(first), Some(last)) = (baseline.first(), baseline.last()) {
        let actual_days = (last.start - first.start).num_days();
        if actual_days < max_days - 1 {
            debug!(
                "Baseline spans {} days, shorter than requested {} days",
                actual_days, max_days
            );
            warnings.push(ModelWarning::baseline_shorter_than_requested(
                max_days,
                actual_days,
            ));
        }
    }

    debug!(
        "Selected {} baseline observations ending {}",
        baseline.len(),
        end
    );

    (baseline, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// One calendar year of hourly observations plus one trailing hour,
    /// 8761 rows, matching an hourly year with inclusive endpoint
    fn one_year_hourly() -> Vec<HourlyObservation> {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        (0..8761)
            .map(|i| HourlyObservation {
                start: start + Duration::hours(i),
                meter_value: 1.0,
                temperature_mean: 50.0,
            })
            .collect()
    }

    #[test]
    fn test_full_year_keeps_all_rows() {
        let observations = one_year_hourly();
        let end = observations.last().unwrap().start;

        let (baseline, warnings) = get_baseline_data(&observations, end, 365);
        assert_eq!(baseline.len(), 8761);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_truncated_window() {
        let observations = one_year_hourly();
        let end = observations.last().unwrap().start;

        let (baseline, warnings) = get_baseline_data(&observations, end, 180);
        assert_eq!(baseline.len(), 180 * 24 + 1);
        assert!(warnings.is_empty());
        assert_eq!(baseline.last().unwrap().start, end);
    }

    #[test]
    fn test_window_includes_both_endpoints() {
        let observations = one_year_hourly();
        let end = observations.last().unwrap().start;

        let (baseline, _) = get_baseline_data(&observations, end, 1);
        assert_eq!(baseline.len(), 24 + 1);
        assert_eq!(baseline.first().unwrap().start, end - Duration::days(1));
        assert_eq!(baseline.last().unwrap().start, end);
    }

    #[test]
    fn test_empty_baseline_warns() {
        let observations = one_year_hourly();
        let end = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();

        let (baseline, warnings) = get_baseline_data(&observations, end, 365);
        assert!(baseline.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].qualified_name,
            "caltrack.baseline.empty_baseline"
        );
    }

    #[test]
    fn test_short_data_warns() {
        let observations: Vec<_> = one_year_hourly().into_iter().take(30 * 24).collect();
        let end = observations.last().unwrap().start;

        let (baseline, warnings) = get_baseline_data(&observations, end, 365);
        assert_eq!(baseline.len(), 30 * 24);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].qualified_name,
            "caltrack.baseline.baseline_shorter_than_requested"
        );
        assert_eq!(warnings[0].data["requested_days"], 365);
    }
}
