//! Webpecker Telemetry CLI
//!
//! Replays captured load-test telemetry and writes dashboard reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use webpecker_telemetry::commands::{
    display_schema, display_version, execute_report, validate_args, validate_report_file,
    ReportArgs,
};
use webpecker_telemetry::store::Selection;

/// Webpecker Telemetry - load-test aggregation
#[derive(Parser, Debug)]
#[command(name = "webpecker-telemetry")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a report from a capture log
    Report {
        /// Newline-delimited capture log of transport messages
        #[arg(short, long, env = "WEBPECKER_CAPTURE")]
        input: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Targets to include, e.g. "1,3" (empty or "all" selects every target)
        #[arg(short, long, default_value = "all")]
        targets: String,

        /// File with one target label per line
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            input,
            output,
            targets,
            labels,
            summary,
        } => {
            let args = ReportArgs {
                input,
                output_json: output,
                selection: Selection::parse(&targets),
                labels,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_report(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
