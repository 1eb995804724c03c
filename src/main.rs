use caltrack::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(caltrack::Error::processing_interrupted(
                    "Processing interrupted by user".to_string(),
                ))
            }
        }
    });

    match result {
        Ok(_stats) => {
            // Success - results have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("CalTRACK Metering Toolkit");
    println!("=========================");
    println!();
    println!("Fit weather-normalized hourly consumption models over baseline meter data");
    println!("and predict the counterfactual usage needed to estimate metered savings.");
    println!();
    println!("USAGE:");
    println!("    caltrack <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    fit         Fit an hourly consumption model over a baseline period");
    println!("    predict     Predict counterfactual usage and estimate savings");
    println!("    samples     List the embedded sample datasets or export one to CSV");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Fit against an embedded sample dataset:");
    println!("    caltrack fit --sample il-electricity-cdd-hdd-hourly --output model.json");
    println!();
    println!("    # Fit against CSV files with one-month segmentation:");
    println!("    caltrack fit --meter meter.csv --temperature temps.csv \\");
    println!("                 --segment-type one_month --output model.json");
    println!();
    println!("    # Predict counterfactual usage and estimate savings:");
    println!("    caltrack predict --model model.json --temperature reporting_temps.csv \\");
    println!("                     --observed reporting_meter.csv --output predictions.csv");
    println!();
    println!("For detailed help on any command, use:");
    println!("    caltrack <COMMAND> --help");
}
