//! Hour-of-week feature
//!
//! Categorizes each observation into one of 168 hours of the week, Monday
//! 00:00 mapping to hour 1 and Sunday 23:00 to hour 168. A segment that does
//! not observe all 168 hours is reported through a warning, since its model
//! will have no coefficient for the unobserved hours.

use super::{FeatureComputer, FeatureValues};
use crate::app::models::ModelWarning;
use crate::app::services::segmentation::Segment;
use crate::constants::HOURS_PER_WEEK;
use std::collections::BTreeSet;

/// Computes the hour-of-week category for every segment row
#[derive(Debug, Clone, Copy, Default)]
pub struct HourOfWeekComputer;

impl FeatureComputer for HourOfWeekComputer {
    fn name(&self) -> &'static str {
        "hour_of_week"
    }

    fn compute(&self, segment: &Segment) -> (FeatureValues, Vec<ModelWarning>) {
        let hours: Vec<u32> = segment
            .observations
            .iter()
            .map(|row| row.observation.hour_of_week())
            .collect();

        let mut warnings = Vec::new();
        if !hours.is_empty() {
            let distinct: BTreeSet<u32> = hours.iter().copied().collect();
            let missing = HOURS_PER_WEEK - distinct.len() as u32;
            if missing > 0 {
                warnings.push(ModelWarning::missing_hours_of_week(missing));
            }
        }

        (FeatureValues::HourOfWeek(hours), warnings)
    }
}
