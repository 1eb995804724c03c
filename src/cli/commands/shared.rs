//! Shared components for CLI commands
//!
//! Common logging setup, progress reporting, and the run statistics type
//! returned by every command.

use crate::Result;
use crate::app::models::ModelWarning;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Run statistics reported by every command
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of meter rows loaded
    pub meter_rows: usize,
    /// Number of temperature rows loaded
    pub temperature_rows: usize,
    /// Number of merged hourly observations
    pub observations: usize,
    /// Number of segment models fit (fit command only)
    pub segment_models: usize,
    /// Number of warnings emitted
    pub warnings: usize,
    /// Total processing time
    pub processing_time: Duration,
    /// Output files written, with their sizes in bytes
    pub outputs: Vec<(String, u64)>,
}

impl RunStats {
    /// Total size of all written outputs in bytes
    pub fn total_output_size(&self) -> u64 {
        self.outputs.iter().map(|(_, size)| size).sum()
    }

    /// Format a byte count in human-readable form
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging at the given level
///
/// A subscriber may already be installed when commands run back to back
/// in one process, so initialization failures are ignored.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("caltrack={}", log_level)));

    if quiet {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Create a spinner-style progress bar for a pipeline stage
pub fn create_stage_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print collected warnings to stderr in a consistent style
pub fn print_warnings(warnings: &[ModelWarning]) {
    if warnings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!(
        "{} {} warning(s):",
        "!".yellow().bold(),
        warnings.len().to_string().yellow()
    );
    for warning in warnings {
        eprintln!(
            "  {} {}",
            warning.qualified_name.yellow(),
            warning.description
        );
    }
}

/// Size of a written output file in bytes, zero when unreadable
pub fn output_size(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}
