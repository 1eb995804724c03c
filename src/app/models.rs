//! Data models for CalTRACK metering
//!
//! This module contains the core data structures for representing meter
//! readings, temperature series, merged hourly observations, segment model
//! identifiers, and legacy billing-period usage records.

pub mod warnings;

pub use warnings::ModelWarning;

use crate::constants::{BTU_PER_KWH, BTU_PER_THERM};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Hourly Series Structures
// =============================================================================

/// A single hourly meter reading
///
/// `value` is the energy used in the hour beginning at `start`, in kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Start of the hour covered by this reading
    pub start: DateTime<Utc>,

    /// Energy used during the hour (kWh)
    pub value: f64,
}

/// A single hourly outdoor temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Start of the hour covered by this reading
    pub start: DateTime<Utc>,

    /// Mean outdoor temperature for the hour (deg F)
    pub temp_f: f64,
}

/// A merged hourly observation combining meter and temperature data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyObservation {
    /// Start of the hour covered by this observation
    pub start: DateTime<Utc>,

    /// Energy used during the hour (kWh)
    pub meter_value: f64,

    /// Mean outdoor temperature for the hour (deg F)
    pub temperature_mean: f64,
}

impl HourlyObservation {
    /// Calendar month (1..=12) of this observation
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Hour-of-week in 1..=168, with Monday 00:00 mapping to 1
    pub fn hour_of_week(&self) -> u32 {
        self.start.weekday().num_days_from_monday() * 24 + self.start.hour() + 1
    }
}

/// An observation carrying a segmentation weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedObservation {
    /// Underlying merged observation
    pub observation: HourlyObservation,

    /// Segmentation weight applied during model fitting
    pub weight: f64,
}

impl WeightedObservation {
    /// Create a weighted observation
    pub fn new(observation: HourlyObservation, weight: f64) -> Self {
        Self {
            observation,
            weight,
        }
    }
}

// =============================================================================
// Segment Model Identifier
// =============================================================================

/// Identifier for a segment model: the ordered calendar months it covers
///
/// Displayed as a parenthesized month list, e.g. `(12, 1, 2)` for a
/// December-centered three-month segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelId(pub Vec<u32>);

impl ModelId {
    /// Identifier covering a single month
    pub fn single_month(month: u32) -> Self {
        Self(vec![month])
    }

    /// Identifier covering all twelve months
    pub fn full_year() -> Self {
        Self((1..=12).collect())
    }

    /// Months covered by this identifier
    pub fn months(&self) -> &[u32] {
        &self.0
    }

    /// Whether the identifier covers the given month
    pub fn contains(&self, month: u32) -> bool {
        self.0.contains(&month)
    }

    /// Whether the identifier carries no months (unlabeled segment)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let months: Vec<String> = self.0.iter().map(|m| m.to_string()).collect();
        write!(f, "({})", months.join(", "))
    }
}

// =============================================================================
// Legacy Billing-Period Usage Structures
// =============================================================================

/// Energy units supported by the legacy computations API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    /// Kilowatt-hour
    KilowattHour,
    /// British thermal unit
    Btu,
    /// Therm (100,000 BTU)
    Therm,
}

impl EnergyUnit {
    /// Conversion factor from this unit to BTU
    pub fn btu_factor(self) -> f64 {
        match self {
            EnergyUnit::KilowattHour => BTU_PER_KWH,
            EnergyUnit::Btu => 1.0,
            EnergyUnit::Therm => BTU_PER_THERM,
        }
    }

    /// Convert a value in this unit to another unit
    pub fn convert(self, value: f64, target: EnergyUnit) -> f64 {
        value * self.btu_factor() / target.btu_factor()
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnergyUnit::KilowattHour => "kWh",
            EnergyUnit::Btu => "BTU",
            EnergyUnit::Therm => "therm",
        };
        write!(f, "{}", name)
    }
}

/// Fuel types for billing-period usage records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    /// Grid electricity
    Electricity,
    /// Natural gas
    NaturalGas,
}

/// A billing-period usage record for the legacy computations API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Usage amount in `unit`
    pub value: f64,

    /// Unit of the usage amount
    pub unit: EnergyUnit,

    /// Fuel consumed
    pub fuel: FuelType,

    /// Start of the billing period (inclusive)
    pub start: DateTime<Utc>,

    /// End of the billing period (exclusive)
    pub end: DateTime<Utc>,
}

impl UsageRecord {
    /// Create a usage record with validation
    pub fn new(
        value: f64,
        unit: EnergyUnit,
        fuel: FuelType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        if start >= end {
            return Err(Error::data_validation(format!(
                "Usage period start {} must be before end {}",
                start, end
            )));
        }

        if !value.is_finite() {
            return Err(Error::data_validation(format!(
                "Usage value {} must be finite",
                value
            )));
        }

        Ok(Self {
            value,
            unit,
            fuel,
            start,
            end,
        })
    }

    /// Length of the billing period in days
    pub fn period_days(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 86_400.0
    }

    /// Usage converted to the given unit
    pub fn value_in(&self, unit: EnergyUnit) -> f64 {
        self.unit.convert(self.value, unit)
    }

    /// Mean daily usage rate in the given unit
    pub fn daily_rate(&self, unit: EnergyUnit) -> f64 {
        self.value_in(unit) / self.period_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation_at(y: i32, mo: u32, d: u32, h: u32) -> HourlyObservation {
        HourlyObservation {
            start: Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap(),
            meter_value: 1.0,
            temperature_mean: 60.0,
        }
    }

    #[test]
    fn test_hour_of_week_monday_midnight_is_one() {
        // 2017-01-02 was a Monday
        let obs = observation_at(2017, 1, 2, 0);
        assert_eq!(obs.hour_of_week(), 1);
    }

    #[test]
    fn test_hour_of_week_sunday_last_hour_is_168() {
        // 2017-01-08 was a Sunday
        let obs = observation_at(2017, 1, 8, 23);
        assert_eq!(obs.hour_of_week(), 168);
    }

    #[test]
    fn test_model_id_display() {
        assert_eq!(ModelId(vec![12, 1, 2]).to_string(), "(12, 1, 2)");
        assert_eq!(ModelId::single_month(7).to_string(), "(7)");
        assert_eq!(ModelId::full_year().months().len(), 12);
    }

    #[test]
    fn test_model_id_contains() {
        let id = ModelId(vec![12, 1, 2]);
        assert!(id.contains(1));
        assert!(!id.contains(6));
        assert!(!id.is_empty());
        assert!(ModelId(vec![]).is_empty());
    }

    #[test]
    fn test_energy_unit_conversion() {
        let kwh = EnergyUnit::KilowattHour;
        assert!((kwh.convert(1.0, EnergyUnit::Btu) - 3412.14).abs() < 1e-9);
        assert!((EnergyUnit::Therm.convert(1.0, EnergyUnit::Btu) - 100_000.0).abs() < 1e-9);
        // Round trip
        let value = kwh.convert(kwh.convert(123.4, EnergyUnit::Therm), EnergyUnit::KilowattHour);
        assert!((value - 123.4).abs() < 1e-9);
    }

    #[test]
    fn test_usage_record_validation() {
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2012, 2, 1, 0, 0, 0).unwrap();

        let record = UsageRecord::new(
            1000.0,
            EnergyUnit::KilowattHour,
            FuelType::Electricity,
            start,
            end,
        )
        .unwrap();
        assert!((record.period_days() - 31.0).abs() < 1e-9);

        // Reversed period rejected
        assert!(
            UsageRecord::new(1000.0, EnergyUnit::KilowattHour, FuelType::Electricity, end, start)
                .is_err()
        );

        // Non-finite value rejected
        assert!(UsageRecord::new(
            f64::NAN,
            EnergyUnit::KilowattHour,
            FuelType::Electricity,
            start,
            end
        )
        .is_err());
    }

    #[test]
    fn test_usage_record_daily_rate() {
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2012, 1, 31, 0, 0, 0).unwrap();
        let record = UsageRecord::new(
            300.0,
            EnergyUnit::KilowattHour,
            FuelType::Electricity,
            start,
            end,
        )
        .unwrap();
        assert!((record.daily_rate(EnergyUnit::KilowattHour) - 10.0).abs() < 1e-9);
    }
}
