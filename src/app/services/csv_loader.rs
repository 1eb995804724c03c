//! CSV and JSON input/output
//!
//! Loads hourly meter and temperature series from headed CSV files and
//! writes fitted models, predictions, and savings detail back out.
//! Timestamps are accepted as RFC 3339 or as naive `YYYY-MM-DD HH:MM:SS`
//! (interpreted as UTC); all output timestamps are RFC 3339.

use crate::app::models::{MeterReading, TemperatureReading};
use crate::app::services::modeling::{ModelFit, SavingsSummary};
use crate::constants::CSV_DATETIME_FORMAT;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Parse a timestamp in either accepted format
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, CSV_DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    Err(Error::datetime_parsing(format!(
        "Cannot parse '{}' as RFC 3339 or '{}'",
        value, CSV_DATETIME_FORMAT
    )))
}

/// Load hourly meter readings from a `start,value` CSV file
pub fn load_meter_csv(path: &Path) -> Result<Vec<MeterReading>> {
    let rows = load_two_column_csv(path, "value")?;
    let readings = rows
        .into_iter()
        .map(|(start, value)| MeterReading { start, value })
        .collect::<Vec<_>>();
    info!("Loaded {} meter readings from {}", readings.len(), path.display());
    Ok(readings)
}

/// Load hourly temperature readings from a `start,temp_f` CSV file
pub fn load_temperature_csv(path: &Path) -> Result<Vec<TemperatureReading>> {
    let rows = load_two_column_csv(path, "temp_f")?;
    let readings = rows
        .into_iter()
        .map(|(start, temp_f)| TemperatureReading { start, temp_f })
        .collect::<Vec<_>>();
    info!(
        "Loaded {} temperature readings from {}",
        readings.len(),
        path.display()
    );
    Ok(readings)
}

/// Shared loader for a headed CSV with a `start` column and one named
/// numeric column
fn load_two_column_csv(path: &Path, value_column: &str) -> Result<Vec<(DateTime<Utc>, f64)>> {
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }
    let file_label = path.display().to_string();

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot open CSV file", Some(e)))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot read CSV headers", Some(e)))?;
    let start_index = find_column(headers, "start", &file_label)?;
    let value_index = find_column(headers, value_column, &file_label)?;

    let mut rows = Vec::new();
    for (row_number, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::csv_parsing(
                &file_label,
                format!("Cannot read row {}", row_number + 2),
                Some(e),
            )
        })?;

        let start_field = record.get(start_index).ok_or_else(|| {
            Error::csv_parsing(
                &file_label,
                format!("Row {} is missing the 'start' column", row_number + 2),
                None,
            )
        })?;
        let start = parse_datetime(start_field).map_err(|e| {
            Error::csv_parsing(
                &file_label,
                format!("Row {}: {}", row_number + 2, e),
                None,
            )
        })?;

        let value_field = record.get(value_index).ok_or_else(|| {
            Error::csv_parsing(
                &file_label,
                format!("Row {} is missing the '{}' column", row_number + 2, value_column),
                None,
            )
        })?;
        let value: f64 = value_field.trim().parse().map_err(|_| {
            Error::csv_parsing(
                &file_label,
                format!(
                    "Row {}: cannot parse '{}' as a number",
                    row_number + 2,
                    value_field
                ),
                None,
            )
        })?;

        rows.push((start, value));
    }

    debug!("Read {} data rows from {}", rows.len(), file_label);
    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, name: &str, file_label: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| {
            Error::csv_parsing(
                file_label,
                format!("Missing required column '{}'", name),
                None,
            )
        })
}

/// Write a fitted model as pretty-printed JSON
pub fn write_model_json(path: &Path, fit: &ModelFit) -> Result<()> {
    let encoded = serde_json::to_string_pretty(fit)
        .map_err(|e| Error::serialization("Cannot serialize model fit", e))?;
    let mut file = File::create(path)
        .map_err(|e| Error::io(format!("Cannot create {}", path.display()), e))?;
    file.write_all(encoded.as_bytes())
        .map_err(|e| Error::io(format!("Cannot write {}", path.display()), e))?;
    info!("Wrote model to {}", path.display());
    Ok(())
}

/// Read a fitted model back from JSON
pub fn read_model_json(path: &Path) -> Result<ModelFit> {
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Cannot read {}", path.display()), e))?;
    let fit = serde_json::from_str(&contents)
        .map_err(|e| Error::serialization(format!("Cannot parse {}", path.display()), e))?;
    debug!("Read model from {}", path.display());
    Ok(fit)
}

/// Write hourly meter readings as a `start,value` CSV file
pub fn write_meter_csv(path: &Path, readings: &[MeterReading]) -> Result<()> {
    let file_label = path.display().to_string();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot create CSV file", Some(e)))?;

    writer
        .write_record(["start", "value"])
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV header", Some(e)))?;
    for reading in readings {
        writer
            .write_record([reading.start.to_rfc3339(), format!("{}", reading.value)])
            .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV row", Some(e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Cannot flush {}", file_label), e))?;

    info!("Wrote {} meter readings to {}", readings.len(), file_label);
    Ok(())
}

/// Write hourly temperature readings as a `start,temp_f` CSV file
pub fn write_temperature_csv(path: &Path, readings: &[TemperatureReading]) -> Result<()> {
    let file_label = path.display().to_string();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot create CSV file", Some(e)))?;

    writer
        .write_record(["start", "temp_f"])
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV header", Some(e)))?;
    for reading in readings {
        writer
            .write_record([reading.start.to_rfc3339(), format!("{}", reading.temp_f)])
            .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV row", Some(e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Cannot flush {}", file_label), e))?;

    info!(
        "Wrote {} temperature readings to {}",
        readings.len(),
        file_label
    );
    Ok(())
}

/// Write hourly predictions as a `start,value` CSV file
pub fn write_predictions_csv(path: &Path, predictions: &[MeterReading]) -> Result<()> {
    let file_label = path.display().to_string();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot create CSV file", Some(e)))?;

    writer
        .write_record(["start", "value"])
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV header", Some(e)))?;
    for prediction in predictions {
        writer
            .write_record([
                prediction.start.to_rfc3339(),
                format!("{}", prediction.value),
            ])
            .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV row", Some(e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Cannot flush {}", file_label), e))?;

    info!("Wrote {} predictions to {}", predictions.len(), file_label);
    Ok(())
}

/// Write hourly savings detail as a CSV file
pub fn write_savings_csv(path: &Path, savings: &SavingsSummary) -> Result<()> {
    let file_label = path.display().to_string();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot create CSV file", Some(e)))?;

    writer
        .write_record(["start", "observed", "counterfactual", "savings"])
        .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV header", Some(e)))?;
    for row in &savings.rows {
        writer
            .write_record([
                row.start.to_rfc3339(),
                format!("{}", row.observed),
                format!("{}", row.counterfactual),
                format!("{}", row.savings),
            ])
            .map_err(|e| Error::csv_parsing(&file_label, "Cannot write CSV row", Some(e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Cannot flush {}", file_label), e))?;

    info!("Wrote {} savings rows to {}", savings.rows.len(), file_label);
    Ok(())
}
