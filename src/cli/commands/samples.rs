//! Samples command implementation
//!
//! Lists the embedded sample datasets with their metadata, or exports one
//! sample's meter and temperature series to CSV files.

use super::shared::{RunStats, output_size, setup_logging};
use crate::app::services::csv_loader::{write_meter_csv, write_temperature_csv};
use crate::app::services::sample_data::{list_samples, load_sample};
use crate::cli::args::{OutputFormat, SamplesArgs};
use crate::{Error, Result};
use colored::Colorize;
use std::time::Instant;
use tracing::info;

/// Samples command runner
pub async fn run_samples(args: SamplesArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), false)?;
    args.validate()?;

    if let Some(name) = args.export.clone() {
        return export_sample(&args, &name, start_time).await;
    }

    info!("Listing embedded sample datasets");

    let mut metadata = Vec::new();
    for name in list_samples() {
        let (_, _, sample_metadata) = load_sample(name)?;
        metadata.push(sample_metadata);
    }

    match args.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&metadata)
                    .map_err(|e| Error::serialization("Cannot serialize sample listing", e))?
            );
        }
        OutputFormat::Human => {
            println!();
            println!("{}", "Embedded sample datasets".bold());
            println!("{}", "========================".bold());
            for sample in &metadata {
                println!();
                println!("{}", sample.name.cyan().bold());
                println!("  {}", sample.description);
                println!(
                    "  {} rows, {} frequency, unit {}",
                    sample.rows, sample.freq, sample.unit
                );
                println!("  {} to {}", sample.start, sample.end);
            }
            println!();
        }
    }

    Ok(RunStats {
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Export one sample's series as `start,value` and `start,temp_f` CSV files
async fn export_sample(args: &SamplesArgs, name: &str, start_time: Instant) -> Result<RunStats> {
    info!("Exporting sample '{}' to CSV", name);

    let (meter_data, temperature_data, metadata) = load_sample(name)?;
    let meter_path = args.meter_output_path(name);
    let temperature_path = args.temperature_output_path(name);

    write_meter_csv(&meter_path, &meter_data)?;
    write_temperature_csv(&temperature_path, &temperature_data)?;

    let stats = RunStats {
        meter_rows: meter_data.len(),
        temperature_rows: temperature_data.len(),
        outputs: vec![
            (meter_path.display().to_string(), output_size(&meter_path)),
            (
                temperature_path.display().to_string(),
                output_size(&temperature_path),
            ),
        ],
        processing_time: start_time.elapsed(),
        ..Default::default()
    };

    if args.output_format == OutputFormat::Human {
        println!();
        println!("{} {}", "Exported".bold(), metadata.name.cyan().bold());
        println!("  {}", metadata.description);
        for (path, size) in &stats.outputs {
            println!("  {} ({})", path.cyan(), RunStats::format_size(*size));
        }
        println!();
    }

    Ok(stats)
}
