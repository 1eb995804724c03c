//! Command-line argument definitions for the CalTRACK metering CLI

use crate::app::services::segmentation::SegmentType;
use crate::constants::{
    DEFAULT_BASELINE_MAX_DAYS, DEFAULT_OCCUPANCY_THRESHOLD, DEFAULT_TEMPERATURE_BIN_ENDPOINTS,
    MIN_HOURLY_COVERAGE, SAMPLE_NAMES,
};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the CalTRACK metering toolkit
///
/// Fits weather-normalized hourly consumption models over baseline meter
/// data and predicts counterfactual usage and savings from them.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "caltrack",
    version,
    about = "Fit CalTRACK hourly consumption models and estimate metered savings",
    long_about = "A toolkit for weather-normalized energy-efficiency metering. Merges hourly \
                  meter readings with outdoor temperatures, fits per-segment weighted least \
                  squares consumption models over a baseline period, and predicts the \
                  counterfactual usage needed to estimate metered savings."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Fit an hourly consumption model over a baseline period
    Fit(FitArgs),
    /// Predict counterfactual usage (and savings) from a fitted model
    Predict(PredictArgs),
    /// List the embedded sample datasets or export one to CSV
    Samples(SamplesArgs),
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

/// Arguments for the fit command
#[derive(Debug, Clone, Parser)]
pub struct FitArgs {
    /// Hourly meter readings CSV with `start` and `value` columns
    #[arg(
        short = 'm',
        long = "meter",
        value_name = "FILE",
        help = "Hourly meter readings CSV (start,value)"
    )]
    pub meter_path: Option<PathBuf>,

    /// Hourly temperature readings CSV with `start` and `temp_f` columns
    #[arg(
        short = 't',
        long = "temperature",
        value_name = "FILE",
        help = "Hourly temperature readings CSV (start,temp_f)"
    )]
    pub temperature_path: Option<PathBuf>,

    /// Fit against an embedded sample dataset instead of CSV files
    ///
    /// Available samples: il-electricity-cdd-hdd-hourly, il-gas-hdd-only-hourly
    #[arg(
        short = 's',
        long = "sample",
        value_name = "NAME",
        help = "Embedded sample dataset to fit against",
        conflicts_with_all = ["meter_path", "temperature_path"]
    )]
    pub sample: Option<String>,

    /// End of the baseline period (RFC 3339 or YYYY-MM-DD HH:MM:SS)
    ///
    /// Defaults to the last merged observation.
    #[arg(
        long = "baseline-end",
        value_name = "TIMESTAMP",
        help = "End of the baseline period (defaults to the last observation)"
    )]
    pub baseline_end: Option<String>,

    /// Maximum baseline length in days, counted back from the baseline end
    #[arg(
        long = "baseline-days",
        value_name = "DAYS",
        default_value_t = DEFAULT_BASELINE_MAX_DAYS,
        help = "Maximum baseline length in days"
    )]
    pub baseline_days: i64,

    /// Segmentation scheme for the baseline
    #[arg(
        long = "segment-type",
        value_name = "SCHEME",
        default_value = "three_month_weighted",
        help = "Segmentation scheme: single, one_month, three_month, three_month_weighted"
    )]
    pub segment_type: SegmentType,

    /// Temperature bin endpoints as a comma-separated list of deg F values
    #[arg(
        long = "bin-endpoints",
        value_name = "LIST",
        help = "Comma-separated temperature bin endpoints (deg F, ascending)"
    )]
    pub bin_endpoints: Option<EndpointList>,

    /// Occupancy threshold on the positive-residual fraction
    #[arg(
        long = "occupancy-threshold",
        value_name = "FRACTION",
        default_value_t = DEFAULT_OCCUPANCY_THRESHOLD,
        help = "Occupancy threshold on the positive-residual fraction"
    )]
    pub occupancy_threshold: f64,

    /// Disable occupancy-by-temperature-bin interaction terms
    #[arg(
        long = "no-occupancy",
        help = "Fit without occupancy interaction terms"
    )]
    pub no_occupancy: bool,

    /// Minimum fraction of a month's hours that must carry data
    #[arg(
        long = "min-coverage",
        value_name = "FRACTION",
        default_value_t = MIN_HOURLY_COVERAGE,
        help = "Minimum hourly coverage fraction per month"
    )]
    pub min_coverage: f64,

    /// Output file for the fitted model (JSON)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Write the fitted model as JSON"
    )]
    pub output: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the fit summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

impl FitArgs {
    /// Validate the fit command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        match (&self.sample, &self.meter_path, &self.temperature_path) {
            (Some(sample), None, None) => {
                if !SAMPLE_NAMES.contains(&sample.as_str()) {
                    return Err(Error::configuration(format!(
                        "Unknown sample '{}'; available samples: {}",
                        sample,
                        SAMPLE_NAMES.join(", ")
                    )));
                }
            }
            (None, Some(meter), Some(temperature)) => {
                if !meter.exists() {
                    return Err(Error::configuration(format!(
                        "Meter file does not exist: {}",
                        meter.display()
                    )));
                }
                if !temperature.exists() {
                    return Err(Error::configuration(format!(
                        "Temperature file does not exist: {}",
                        temperature.display()
                    )));
                }
            }
            _ => {
                return Err(Error::configuration(
                    "Provide either --sample or both --meter and --temperature",
                ));
            }
        }

        if self.baseline_days <= 0 {
            return Err(Error::configuration(format!(
                "Baseline days must be positive, got {}",
                self.baseline_days
            )));
        }

        Ok(())
    }

    /// Temperature bin endpoints to fit with
    pub fn endpoints(&self) -> Vec<f64> {
        self.bin_endpoints
            .as_ref()
            .map(|list| list.endpoints.clone())
            .unwrap_or_else(|| DEFAULT_TEMPERATURE_BIN_ENDPOINTS.to_vec())
    }

    /// Get the effective log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.quiet, self.verbose)
    }

    /// Check if we should show progress output (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the predict command
#[derive(Debug, Clone, Parser)]
pub struct PredictArgs {
    /// Fitted model JSON produced by the fit command
    #[arg(
        long = "model",
        value_name = "FILE",
        help = "Fitted model JSON produced by 'caltrack fit'"
    )]
    pub model_path: PathBuf,

    /// Hourly temperature readings CSV with `start` and `temp_f` columns
    #[arg(
        short = 't',
        long = "temperature",
        value_name = "FILE",
        help = "Hourly temperature readings CSV (start,temp_f)"
    )]
    pub temperature_path: PathBuf,

    /// Observed reporting-period meter readings CSV for savings estimation
    #[arg(
        long = "observed",
        value_name = "FILE",
        help = "Observed reporting-period meter CSV; enables savings estimation"
    )]
    pub observed_path: Option<PathBuf>,

    /// Output file for hourly predictions (CSV)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Write hourly predictions as CSV"
    )]
    pub output: Option<PathBuf>,

    /// Output file for hourly savings detail (CSV)
    #[arg(
        long = "savings-output",
        value_name = "FILE",
        help = "Write hourly savings detail as CSV (requires --observed)"
    )]
    pub savings_output: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the prediction summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

impl PredictArgs {
    /// Validate the predict command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.model_path.exists() {
            return Err(Error::configuration(format!(
                "Model file does not exist: {}",
                self.model_path.display()
            )));
        }
        if !self.temperature_path.exists() {
            return Err(Error::configuration(format!(
                "Temperature file does not exist: {}",
                self.temperature_path.display()
            )));
        }
        if let Some(observed) = &self.observed_path {
            if !observed.exists() {
                return Err(Error::configuration(format!(
                    "Observed meter file does not exist: {}",
                    observed.display()
                )));
            }
        }
        if self.savings_output.is_some() && self.observed_path.is_none() {
            return Err(Error::configuration(
                "--savings-output requires --observed",
            ));
        }

        Ok(())
    }

    /// Get the effective log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.quiet, self.verbose)
    }
}

/// Arguments for the samples command
#[derive(Debug, Clone, Parser)]
pub struct SamplesArgs {
    /// Export this sample's meter and temperature series as CSV files
    ///
    /// Available samples: il-electricity-cdd-hdd-hourly, il-gas-hdd-only-hourly
    #[arg(
        short = 'e',
        long = "export",
        value_name = "NAME",
        help = "Export a sample's series to CSV instead of listing"
    )]
    pub export: Option<String>,

    /// Output file for the exported meter readings CSV
    #[arg(
        long = "meter-output",
        value_name = "FILE",
        requires = "export",
        help = "Meter CSV path for --export (default: <NAME>-meter.csv)"
    )]
    pub meter_output: Option<PathBuf>,

    /// Output file for the exported temperature readings CSV
    #[arg(
        long = "temperature-output",
        value_name = "FILE",
        requires = "export",
        help = "Temperature CSV path for --export (default: <NAME>-temperature.csv)"
    )]
    pub temperature_output: Option<PathBuf>,

    /// Output format for the sample listing
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the sample listing"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl SamplesArgs {
    /// Validate the samples command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(export) = &self.export {
            if !SAMPLE_NAMES.contains(&export.as_str()) {
                return Err(Error::configuration(format!(
                    "Unknown sample '{}'; available samples: {}",
                    export,
                    SAMPLE_NAMES.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Meter CSV path for an export, defaulting to `<NAME>-meter.csv`
    pub fn meter_output_path(&self, name: &str) -> PathBuf {
        self.meter_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-meter.csv", name)))
    }

    /// Temperature CSV path for an export, defaulting to
    /// `<NAME>-temperature.csv`
    pub fn temperature_output_path(&self, name: &str) -> PathBuf {
        self.temperature_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-temperature.csv", name)))
    }

    /// Get the effective log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(false, self.verbose)
    }
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Wrapper for parsing comma-separated temperature bin endpoint lists
#[derive(Debug, Clone)]
pub struct EndpointList {
    pub endpoints: Vec<f64>,
}

impl FromStr for EndpointList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let endpoints = s
            .split(',')
            .map(|item| {
                item.trim().parse::<f64>().map_err(|_| {
                    Error::configuration(format!("Invalid bin endpoint '{}'", item.trim()))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if endpoints.is_empty() {
            return Err(Error::configuration("Bin endpoint list cannot be empty"));
        }
        if endpoints.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::configuration(
                "Bin endpoints must be strictly ascending",
            ));
        }

        Ok(Self { endpoints })
    }
}

fn log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_list_parsing() {
        let list: EndpointList = "30,45, 55,65".parse().unwrap();
        assert_eq!(list.endpoints, vec![30.0, 45.0, 55.0, 65.0]);

        assert!("".parse::<EndpointList>().is_err());
        assert!("30,20".parse::<EndpointList>().is_err());
        assert!("30,abc".parse::<EndpointList>().is_err());
    }

    #[test]
    fn test_fit_args_require_a_data_source() {
        let args = Args::parse_from(["caltrack", "fit"]);
        let Commands::Fit(fit_args) = args.get_command() else {
            panic!("expected fit command");
        };
        assert!(fit_args.validate().is_err());
    }

    #[test]
    fn test_fit_args_sample_and_defaults() {
        let args = Args::parse_from(["caltrack", "fit", "--sample", "il-electricity-cdd-hdd-hourly"]);
        let Commands::Fit(fit_args) = args.get_command() else {
            panic!("expected fit command");
        };
        assert!(fit_args.validate().is_ok());
        assert_eq!(fit_args.baseline_days, 365);
        assert_eq!(fit_args.segment_type, SegmentType::ThreeMonthWeighted);
        assert_eq!(fit_args.endpoints(), vec![30.0, 45.0, 55.0, 65.0, 75.0, 90.0]);
        assert_eq!(fit_args.get_log_level(), "warn");
    }

    #[test]
    fn test_unknown_sample_rejected() {
        let args = Args::parse_from(["caltrack", "fit", "--sample", "no-such-sample"]);
        let Commands::Fit(fit_args) = args.get_command() else {
            panic!("expected fit command");
        };
        assert!(fit_args.validate().is_err());
    }

    #[test]
    fn test_segment_type_argument_parsing() {
        let args = Args::parse_from([
            "caltrack",
            "fit",
            "--sample",
            "il-gas-hdd-only-hourly",
            "--segment-type",
            "one_month",
        ]);
        let Commands::Fit(fit_args) = args.get_command() else {
            panic!("expected fit command");
        };
        assert_eq!(fit_args.segment_type, SegmentType::OneMonth);

        assert!(
            Args::try_parse_from([
                "caltrack",
                "fit",
                "--sample",
                "il-gas-hdd-only-hourly",
                "--segment-type",
                "weekly",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_samples_export_arguments() {
        let args = Args::parse_from([
            "caltrack",
            "samples",
            "--export",
            "il-gas-hdd-only-hourly",
            "--meter-output",
            "gas.csv",
        ]);
        let Commands::Samples(samples_args) = args.get_command() else {
            panic!("expected samples command");
        };
        assert!(samples_args.validate().is_ok());
        assert_eq!(
            samples_args.meter_output_path("il-gas-hdd-only-hourly"),
            PathBuf::from("gas.csv")
        );
        assert_eq!(
            samples_args.temperature_output_path("il-gas-hdd-only-hourly"),
            PathBuf::from("il-gas-hdd-only-hourly-temperature.csv")
        );
    }

    #[test]
    fn test_samples_export_rejects_unknown_sample() {
        let args = Args::parse_from(["caltrack", "samples", "--export", "no-such-sample"]);
        let Commands::Samples(samples_args) = args.get_command() else {
            panic!("expected samples command");
        };
        assert!(samples_args.validate().is_err());
    }

    #[test]
    fn test_samples_output_paths_require_export() {
        assert!(
            Args::try_parse_from(["caltrack", "samples", "--meter-output", "m.csv"]).is_err()
        );
        assert!(
            Args::try_parse_from(["caltrack", "samples", "--temperature-output", "t.csv"])
                .is_err()
        );
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Args::parse_from(["caltrack", "fit", "-s", "il-gas-hdd-only-hourly", "-vv"]);
        let Commands::Fit(fit_args) = args.get_command() else {
            panic!("expected fit command");
        };
        assert_eq!(fit_args.get_log_level(), "debug");
        assert!(fit_args.show_progress());
    }
}
