//! Command implementations for the CalTRACK metering CLI
//!
//! Each command lives in its own module; `shared` holds the logging setup,
//! progress helpers, and the run statistics type they all report.

pub mod fit;
pub mod predict;
pub mod samples;
pub mod shared;

pub use shared::RunStats;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler:
/// - `fit`: baseline selection and hourly model fitting
/// - `predict`: counterfactual prediction and savings estimation
/// - `samples`: embedded sample dataset listing and CSV export
pub async fn run(args: Args) -> Result<RunStats> {
    match args.get_command() {
        Commands::Fit(fit_args) => fit::run_fit(fit_args).await,
        Commands::Predict(predict_args) => predict::run_predict(predict_args).await,
        Commands::Samples(samples_args) => samples::run_samples(samples_args).await,
    }
}
