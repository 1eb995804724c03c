//! Fit command implementation
//!
//! Loads meter and temperature data (from CSV files or an embedded
//! sample), selects the baseline period, fits the hourly consumption
//! model, and reports the result.

use super::shared::{RunStats, create_stage_spinner, output_size, print_warnings, setup_logging};
use crate::app::services::baseline::get_baseline_data;
use crate::app::services::csv_loader::{
    load_meter_csv, load_temperature_csv, parse_datetime, write_model_json,
};
use crate::app::services::modeling::{ModelStatus, fit_hourly_model};
use crate::app::services::sample_data::load_sample;
use crate::app::services::temperature::merge_temperature_data;
use crate::cli::args::{FitArgs, OutputFormat};
use crate::config::ModelConfig;
use crate::{Error, Result};
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Fit command runner
pub async fn run_fit(args: FitArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    info!("Starting hourly model fit");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    // Load the input series
    let (meter_data, temperature_data) = if let Some(sample) = &args.sample {
        let (meter, temperature, metadata) = load_sample(sample)?;
        info!("Loaded sample '{}' ({} rows)", metadata.name, metadata.rows);
        (meter, temperature)
    } else {
        let meter_path = args
            .meter_path
            .as_ref()
            .ok_or_else(|| Error::configuration("Missing --meter path"))?;
        let temperature_path = args
            .temperature_path
            .as_ref()
            .ok_or_else(|| Error::configuration("Missing --temperature path"))?;
        (
            load_meter_csv(meter_path)?,
            load_temperature_csv(temperature_path)?,
        )
    };

    let observations = merge_temperature_data(&meter_data, &temperature_data);
    if observations.is_empty() {
        return Err(Error::data_validation(
            "No overlapping hours between meter and temperature data",
        ));
    }

    // Baseline selection
    let baseline_end = match &args.baseline_end {
        Some(timestamp) => parse_datetime(timestamp)?,
        None => observations[observations.len() - 1].start,
    };
    let (baseline, baseline_warnings) =
        get_baseline_data(&observations, baseline_end, args.baseline_days);
    info!(
        "Baseline: {} of {} observations ending {}",
        baseline.len(),
        observations.len(),
        baseline_end
    );

    // Model fitting
    let config = ModelConfig {
        segment_type: args.segment_type,
        baseline_max_days: args.baseline_days,
        occupancy_threshold: args.occupancy_threshold,
        min_hourly_coverage: args.min_coverage,
        temperature_bin_endpoints: args.endpoints(),
        include_occupancy_interactions: !args.no_occupancy,
    };

    let spinner = args
        .show_progress()
        .then(|| create_stage_spinner("Fitting hourly consumption models"));
    let mut fit = fit_hourly_model(&baseline, &config)?;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    // Baseline warnings precede pipeline warnings in the report
    let mut warnings = baseline_warnings;
    warnings.append(&mut fit.warnings);
    fit.warnings = warnings;

    let mut stats = RunStats {
        meter_rows: meter_data.len(),
        temperature_rows: temperature_data.len(),
        observations: observations.len(),
        segment_models: fit
            .model
            .as_ref()
            .map(|model| model.segment_models.len())
            .unwrap_or(0),
        warnings: fit.warnings.len(),
        ..Default::default()
    };

    if let Some(output) = &args.output {
        write_model_json(output, &fit)?;
        stats
            .outputs
            .push((output.display().to_string(), output_size(output)));
    }

    stats.processing_time = start_time.elapsed();

    match args.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&fit)
                    .map_err(|e| Error::serialization("Cannot serialize fit summary", e))?
            );
        }
        OutputFormat::Human => {
            if !args.quiet {
                report_fit(&fit, &stats);
            }
        }
    }

    if fit.status != ModelStatus::Success {
        return Err(Error::model_fitting(format!(
            "Model fit did not succeed: {}",
            fit.status
        )));
    }

    Ok(stats)
}

/// Print the human-readable fit report
fn report_fit(fit: &crate::app::services::modeling::ModelFit, stats: &RunStats) {
    println!();
    println!("{}", "CalTRACK hourly model fit".bold());
    println!("{}", "=========================".bold());

    let status = match fit.status {
        ModelStatus::Success => fit.status.to_string().green().bold(),
        _ => fit.status.to_string().red().bold(),
    };
    println!("Status:          {}", status);
    println!("Method:          {}", fit.method_name);
    println!("Observations:    {}", stats.observations);
    println!("Segment models:  {}", stats.segment_models);

    if let Some(metrics) = &fit.metrics {
        println!();
        println!("In-sample metrics over {} primary rows:", metrics.n_obs);
        println!("  RMSE:    {:.4}", metrics.rmse);
        if let Some(cvrmse) = metrics.cvrmse {
            println!("  CVRMSE:  {:.4}", cvrmse);
        }
        if let Some(nmbe) = metrics.nmbe {
            println!("  NMBE:    {:+.4}", nmbe);
        }
        if let Some(r_squared) = metrics.r_squared {
            println!("  R2:      {:.4}", r_squared);
        }
    }

    for (path, size) in &stats.outputs {
        println!();
        println!(
            "Wrote {} ({})",
            path.cyan(),
            RunStats::format_size(*size)
        );
    }

    print_warnings(&fit.warnings);

    println!();
    println!(
        "Completed in {:.2}s",
        stats.processing_time.as_secs_f64()
    );
}
