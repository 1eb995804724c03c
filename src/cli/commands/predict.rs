//! Predict command implementation
//!
//! Reads a fitted model, predicts counterfactual usage over a temperature
//! series, and (when observed reporting-period usage is supplied)
//! estimates metered savings.

use super::shared::{RunStats, output_size, print_warnings, setup_logging};
use crate::app::services::csv_loader::{
    load_meter_csv, load_temperature_csv, read_model_json, write_predictions_csv,
    write_savings_csv,
};
use crate::cli::args::{OutputFormat, PredictArgs};
use crate::{Error, Result};
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Predict command runner
pub async fn run_predict(args: PredictArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    info!("Starting counterfactual prediction");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let fit = read_model_json(&args.model_path)?;
    let model = fit.model.as_ref().ok_or_else(|| {
        Error::model_fitting(format!(
            "Model file {} holds a fit with status {} and no model",
            args.model_path.display(),
            fit.status
        ))
    })?;

    let temperatures = load_temperature_csv(&args.temperature_path)?;
    let prediction = model.predict(&temperatures)?;

    let mut stats = RunStats {
        temperature_rows: temperatures.len(),
        observations: prediction.predictions.len(),
        ..Default::default()
    };

    if let Some(output) = &args.output {
        write_predictions_csv(output, &prediction.predictions)?;
        stats
            .outputs
            .push((output.display().to_string(), output_size(output)));
    }

    // Savings estimation against observed reporting-period usage
    let savings = if let Some(observed_path) = &args.observed_path {
        let observed = load_meter_csv(observed_path)?;
        let reporting = crate::app::services::temperature::merge_temperature_data(
            &observed,
            &temperatures,
        );
        if reporting.is_empty() {
            return Err(Error::data_validation(
                "No overlapping hours between observed meter and temperature data",
            ));
        }
        stats.meter_rows = observed.len();

        let summary = model.metered_savings(&reporting)?;
        if let Some(savings_output) = &args.savings_output {
            write_savings_csv(savings_output, &summary)?;
            stats
                .outputs
                .push((savings_output.display().to_string(), output_size(savings_output)));
        }
        Some(summary)
    } else {
        None
    };

    stats.processing_time = start_time.elapsed();

    match args.output_format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "predicted_hours": prediction.predictions.len(),
                "skipped_hours": prediction.skipped_rows,
                "predicted_total": prediction.total(),
                "savings": savings,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .map_err(|e| Error::serialization("Cannot serialize prediction summary", e))?
            );
        }
        OutputFormat::Human => {
            if !args.quiet {
                report_prediction(&prediction, savings.as_ref(), &stats);
                print_warnings(&fit.warnings);
            }
        }
    }

    Ok(stats)
}

fn report_prediction(
    prediction: &crate::app::services::modeling::HourlyPrediction,
    savings: Option<&crate::app::services::modeling::SavingsSummary>,
    stats: &RunStats,
) {
    println!();
    println!("{}", "Counterfactual prediction".bold());
    println!("{}", "=========================".bold());
    println!("Predicted hours: {}", prediction.predictions.len());
    if prediction.skipped_rows > 0 {
        println!(
            "Skipped hours:   {} {}",
            prediction.skipped_rows,
            "(no segment model for their months)".yellow()
        );
    }
    println!("Predicted total: {:.2} kWh", prediction.total());

    if let Some(summary) = savings {
        println!();
        println!("{}", "Metered savings".bold());
        println!("Counterfactual:  {:.2} kWh", summary.counterfactual_total);
        println!("Observed:        {:.2} kWh", summary.observed_total);
        let savings_line = format!("{:.2} kWh", summary.total_savings);
        if summary.total_savings >= 0.0 {
            println!("Savings:         {}", savings_line.green().bold());
        } else {
            println!("Savings:         {}", savings_line.red().bold());
        }
        if let Some(percent) = summary.percent_savings {
            println!("Percent savings: {:.2}%", percent * 100.0);
        }
    }

    for (path, size) in &stats.outputs {
        println!();
        println!("Wrote {} ({})", path.cyan(), RunStats::format_size(*size));
    }

    println!();
    println!("Completed in {:.2}s", stats.processing_time.as_secs_f64());
}
