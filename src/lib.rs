//! CalTRACK Metering Library
//!
//! A Rust library for weather-normalized energy-efficiency metering built
//! around the CalTRACK hourly method.
//!
//! This library provides tools for:
//! - Merging hourly meter readings with outdoor temperature series
//! - Selecting a baseline period from a merged observation series
//! - Segmenting baselines into calendar-month models with blended weights
//! - Deriving hour-of-week, occupancy, and temperature-bin features
//! - Fitting per-segment weighted least squares consumption models
//! - Predicting counterfactual usage and estimating metered savings
//! - Legacy billing-period computations (unit conversion, annualized usage,
//!   degree-day weather normalization)

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod baseline;
        pub mod computations;
        pub mod csv_loader;
        pub mod features;
        pub mod modeling;
        pub mod sample_data;
        pub mod segmentation;
        pub mod temperature;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{HourlyObservation, MeterReading, ModelId, ModelWarning, TemperatureReading};
pub use app::services::modeling::{HourlyModel, ModelFit, ModelStatus};
pub use app::services::segmentation::{SegmentType, SegmentedSeries};
pub use config::ModelConfig;

/// Result type alias for the CalTRACK metering library
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for metering operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Invalid segment type
    #[error(
        "Invalid segment type '{value}': must be one of single, one_month, three_month, three_month_weighted"
    )]
    InvalidSegmentType { value: String },

    /// Model fitting error
    #[error("Model fitting error: {message}")]
    ModelFitting { message: String },

    /// Singular regression system
    #[error("Singular system: {message}")]
    SingularSystem { message: String },

    /// Unknown sample dataset
    #[error("Unknown sample dataset: {name}")]
    UnknownSample { name: String },

    /// JSON serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create an invalid segment type error
    pub fn invalid_segment_type(value: impl Into<String>) -> Self {
        Self::InvalidSegmentType {
            value: value.into(),
        }
    }

    /// Create a model fitting error
    pub fn model_fitting(message: impl Into<String>) -> Self {
        Self::ModelFitting {
            message: message.into(),
        }
    }

    /// Create a singular system error
    pub fn singular_system(message: impl Into<String>) -> Self {
        Self::SingularSystem {
            message: message.into(),
        }
    }

    /// Create an unknown sample error
    pub fn unknown_sample(name: impl Into<String>) -> Self {
        Self::UnknownSample { name: name.into() }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}
