//! Application constants for the CalTRACK metering toolkit
//!
//! This module contains the configuration constants, default values, and
//! small helper functions shared across the metering pipeline.

// =============================================================================
// Calendar and Hour-of-Week Constants
// =============================================================================

/// Hours in a full week (7 x 24); hour-of-week values run 1..=HOURS_PER_WEEK
pub const HOURS_PER_WEEK: u32 = 168;

/// Months in a calendar year
pub const MONTHS_PER_YEAR: u32 = 12;

/// Days used to annualize a mean daily rate
pub const DAYS_PER_YEAR: f64 = 365.25;

// =============================================================================
// Baseline Selection Defaults
// =============================================================================

/// Default maximum baseline length in days
pub const DEFAULT_BASELINE_MAX_DAYS: i64 = 365;

// =============================================================================
// Segmentation Constants
// =============================================================================

/// Weight assigned to observations from months adjacent to a segment's
/// central month under three-month-weighted segmentation
pub const SEGMENT_ADJACENT_WEIGHT: f64 = 0.5;

/// Weight assigned to observations from a segment's own months
pub const SEGMENT_PRIMARY_WEIGHT: f64 = 1.0;

/// Minimum fraction of a month's hours that must carry data before the
/// month's model is considered sufficiently covered
pub const MIN_HOURLY_COVERAGE: f64 = 0.9;

// =============================================================================
// Feature Defaults
// =============================================================================

/// Default occupancy threshold: an hour-of-week is occupied when more than
/// this fraction of its degree-day model residuals are positive
pub const DEFAULT_OCCUPANCY_THRESHOLD: f64 = 0.65;

/// Cooling balance point (deg F) for the occupancy submodel
pub const OCCUPANCY_COOLING_BALANCE_POINT_F: f64 = 65.0;

/// Heating balance point (deg F) for the occupancy submodel
pub const OCCUPANCY_HEATING_BALANCE_POINT_F: f64 = 50.0;

/// Default temperature bin endpoints (deg F)
pub const DEFAULT_TEMPERATURE_BIN_ENDPOINTS: &[f64] = &[30.0, 45.0, 55.0, 65.0, 75.0, 90.0];

/// Minimum observations required on each side of a bin endpoint for the
/// endpoint to be retained during bin validation
pub const MIN_TEMPERATURE_BIN_COUNT: usize = 20;

// =============================================================================
// Weather Normalization Constants
// =============================================================================

/// Heating balance point (deg F) used by legacy weather normalization
pub const NORMALIZATION_HEATING_BALANCE_POINT_F: f64 = 65.0;

// =============================================================================
// Energy Unit Conversion Factors
// =============================================================================

/// BTU per kilowatt-hour
pub const BTU_PER_KWH: f64 = 3412.14;

/// BTU per therm
pub const BTU_PER_THERM: f64 = 100_000.0;

// =============================================================================
// Method and Warning Identifiers
// =============================================================================

/// Method name reported on hourly model fits
pub const CALTRACK_HOURLY_METHOD_NAME: &str = "caltrack_hourly";

/// Qualified-name prefix for hourly pipeline warnings
pub const HOURLY_WARNING_PREFIX: &str = "caltrack.hourly";

/// Qualified-name prefix for baseline selection warnings
pub const BASELINE_WARNING_PREFIX: &str = "caltrack.baseline";

// =============================================================================
// Sample Dataset Names
// =============================================================================

/// Embedded sample dataset names
pub const SAMPLE_NAMES: &[&str] = &[
    "il-electricity-cdd-hdd-hourly",
    "il-gas-hdd-only-hourly",
];

// =============================================================================
// Timestamp Formats
// =============================================================================

/// Primary datetime format accepted in CSV inputs
pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Helper Functions
// =============================================================================

/// Wrap a 1-based month offset onto the 1..=12 range
pub fn wrap_month(month: i32) -> u32 {
    ((month - 1).rem_euclid(MONTHS_PER_YEAR as i32) + 1) as u32
}

/// Number of hours in the given month of the given year
pub fn hours_in_month(year: i32, month: u32) -> u32 {
    days_in_month(year, month) * 24
}

/// Number of days in the given month of the given year
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Gregorian leap year check
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
