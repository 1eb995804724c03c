//! Legacy billing-period computations
//!
//! Unit-aware summaries over billing-period usage records: the mean period
//! usage and a degree-day weather normalization. These predate the hourly
//! method and operate on coarse monthly records rather than hourly
//! observations.

use crate::app::models::{EnergyUnit, UsageRecord};
use crate::app::services::modeling::wls::fit_wls;
use crate::app::services::temperature::heating_degrees;
use crate::constants::{DAYS_PER_YEAR, NORMALIZATION_HEATING_BALANCE_POINT_F};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean billing-period usage in the target unit
///
/// Records may carry mixed units; each is converted before averaging.
pub fn annualized_mean_usage(records: &[UsageRecord], unit: EnergyUnit) -> Result<f64> {
    if records.is_empty() {
        return Err(Error::data_validation(
            "Cannot compute mean usage over no records",
        ));
    }

    let total: f64 = records.iter().map(|record| record.value_in(unit)).sum();
    Ok(total / records.len() as f64)
}

/// Result of a degree-day weather normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedUsage {
    /// Normalized annual usage in the requested unit
    pub annual_usage: f64,

    /// Fitted base daily usage (the regression intercept)
    pub base_daily_usage: f64,

    /// Fitted usage per heating degree day
    pub usage_per_hdd: f64,

    /// Unit of the usage figures
    pub unit: EnergyUnit,
}

/// Weather-normalize billing-period usage against heating degree days
///
/// Fits `daily_usage ~ intercept + hdd_rate` over the billing periods,
/// where each period's heating degree days per day are computed from its
/// mean temperature against the 65F balance point, then projects the fit
/// onto a normal year with `normal_annual_hdd` heating degree days.
///
/// `period_mean_temps_f` must hold one mean temperature per record, in
/// record order.
pub fn weather_normalize(
    records: &[UsageRecord],
    period_mean_temps_f: &[f64],
    normal_annual_hdd: f64,
    unit: EnergyUnit,
) -> Result<NormalizedUsage> {
    if records.len() < 2 {
        return Err(Error::data_validation(
            "Weather normalization needs at least two billing periods",
        ));
    }
    if records.len() != period_mean_temps_f.len() {
        return Err(Error::data_validation(format!(
            "Got {} usage records but {} period temperatures",
            records.len(),
            period_mean_temps_f.len()
        )));
    }
    if normal_annual_hdd < 0.0 {
        return Err(Error::data_validation(
            "Normal annual heating degree days must be non-negative",
        ));
    }

    let design: Vec<Vec<f64>> = period_mean_temps_f
        .iter()
        .map(|&temp| {
            vec![
                1.0,
                heating_degrees(temp, NORMALIZATION_HEATING_BALANCE_POINT_F),
            ]
        })
        .collect();
    let response: Vec<f64> = records
        .iter()
        .map(|record| record.daily_rate(unit))
        .collect();
    let weights: Vec<f64> = records.iter().map(|record| record.period_days()).collect();

    let fit = fit_wls(&design, &response, &weights)?;
    let base_daily_usage = fit.coefficients[0];
    let usage_per_hdd = fit.coefficients[1];

    let annual_usage = base_daily_usage * DAYS_PER_YEAR + usage_per_hdd * normal_annual_hdd;
    debug!(
        "Weather normalization: base {:.4}/day, {:.4}/HDD, normalized {:.2} {}",
        base_daily_usage, usage_per_hdd, annual_usage, unit
    );

    Ok(NormalizedUsage {
        annual_usage,
        base_daily_usage,
        usage_per_hdd,
        unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::FuelType;
    use chrono::{TimeZone, Utc};

    /// Twelve calendar-month electricity records for 2012 with a seasonal
    /// usage shape peaking in June
    fn one_year_electricity() -> Vec<UsageRecord> {
        let values = [
            1000.0, 1100.0, 1200.0, 1300.0, 1400.0, 1500.0, 1400.0, 1300.0, 1200.0, 1100.0,
            1000.0, 900.0,
        ];
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let month = i as u32 + 1;
                let start = Utc.with_ymd_and_hms(2012, month, 1, 0, 0, 0).unwrap();
                let end = if month == 12 {
                    Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap()
                } else {
                    Utc.with_ymd_and_hms(2012, month + 1, 1, 0, 0, 0).unwrap()
                };
                UsageRecord::new(value, EnergyUnit::KilowattHour, FuelType::Electricity, start, end)
                    .unwrap()
            })
            .collect()
    }

    fn one_summer_electricity() -> Vec<UsageRecord> {
        [(6, 1600.0), (7, 1700.0), (8, 1800.0)]
            .iter()
            .map(|&(month, value)| {
                let start = Utc.with_ymd_and_hms(2012, month, 1, 0, 0, 0).unwrap();
                let end = Utc.with_ymd_and_hms(2012, month + 1, 1, 0, 0, 0).unwrap();
                UsageRecord::new(value, EnergyUnit::KilowattHour, FuelType::Electricity, start, end)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_annualized_mean_usage_full_year() {
        let usage = annualized_mean_usage(&one_year_electricity(), EnergyUnit::KilowattHour)
            .unwrap();
        assert!((usage - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_annualized_mean_usage_summer() {
        let usage = annualized_mean_usage(&one_summer_electricity(), EnergyUnit::KilowattHour)
            .unwrap();
        assert!((usage - 1700.0).abs() < 1e-6);
    }

    #[test]
    fn test_annualized_mean_usage_unit_conversion() {
        let usage = annualized_mean_usage(&one_summer_electricity(), EnergyUnit::Btu).unwrap();
        assert!((usage - 1700.0 * 3412.14).abs() < 1e-6);
    }

    #[test]
    fn test_annualized_mean_usage_empty() {
        assert!(annualized_mean_usage(&[], EnergyUnit::KilowattHour).is_err());
    }

    #[test]
    fn test_weather_normalize_recovers_linear_model() {
        // Usage generated as exactly 10/day + 2 per HDD-day
        let temps = [20.0, 15.0, 20.0, 35.0, 55.0, 65.0, 80.0, 80.0, 60.0, 45.0, 40.0, 30.0];
        let records: Vec<UsageRecord> = one_year_electricity()
            .into_iter()
            .zip(&temps)
            .map(|(record, &temp)| {
                let hdd_per_day = (65.0f64 - temp).max(0.0);
                let daily = 10.0 + 2.0 * hdd_per_day;
                UsageRecord::new(
                    daily * record.period_days(),
                    EnergyUnit::KilowattHour,
                    FuelType::Electricity,
                    record.start,
                    record.end,
                )
                .unwrap()
            })
            .collect();

        let normalized = weather_normalize(&records, &temps, 6000.0, EnergyUnit::KilowattHour)
            .unwrap();

        assert!((normalized.base_daily_usage - 10.0).abs() < 1e-9);
        assert!((normalized.usage_per_hdd - 2.0).abs() < 1e-9);
        assert!((normalized.annual_usage - (10.0 * 365.25 + 2.0 * 6000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_weather_normalize_input_validation() {
        let records = one_summer_electricity();
        // Length mismatch
        assert!(
            weather_normalize(&records, &[70.0], 6000.0, EnergyUnit::KilowattHour).is_err()
        );
        // Too few periods
        assert!(
            weather_normalize(&records[..1], &[70.0], 6000.0, EnergyUnit::KilowattHour).is_err()
        );
        // Negative normal HDD
        assert!(
            weather_normalize(&records, &[70.0, 72.0, 74.0], -1.0, EnergyUnit::KilowattHour)
                .is_err()
        );
    }
}
