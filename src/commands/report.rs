//! Report command implementation.
//!
//! The report command:
//! 1. Reads a capture log of transport messages
//! 2. Replays the points into a fresh event store
//! 3. Loads target labels
//! 4. Runs every aggregation for the selection
//! 5. Writes the JSON report

use crate::output::{render_text_summary, write_report};
use crate::parser::{read_capture_log, Report};
use crate::store::{EventStore, Selection};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Newline-delimited capture log to replay
    pub input: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Targets to report on
    pub selection: Selection,

    /// Optional file with one target label per line (line N labels target N)
    pub labels: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("capture.log"),
            output_json: PathBuf::from("report.json"),
            selection: Selection::All,
            labels: None,
            print_summary: false,
        }
    }
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Capture log cannot be read or contains malformed messages
/// * Labels file cannot be read
/// * Report cannot be written
pub fn execute_report(args: ReportArgs) -> Result<Report> {
    let start_time = Instant::now();

    info!("Building report from: {}", args.input.display());
    info!("Selection: {}", args.selection);

    // Step 1: Read capture log
    info!("Step 1/5: Reading capture log...");
    let points = read_capture_log(&args.input)
        .with_context(|| format!("Failed to read capture log {}", args.input.display()))?;

    // Step 2: Replay into the store
    info!("Step 2/5: Replaying {} points...", points.len());
    let mut store = EventStore::new();
    store.ingest_all(points);

    debug!("Store holds {} points for {} targets",
           store.point_count(),
           store.target_count());

    // Step 3: Labels
    info!("Step 3/5: Loading target labels...");
    let labels = match &args.labels {
        Some(path) => read_labels(path)
            .with_context(|| format!("Failed to read labels {}", path.display()))?,
        None => Vec::new(),
    };

    // Step 4: Aggregate
    info!("Step 4/5: Aggregating...");
    let report = Report::build(
        &store,
        &args.selection,
        &labels,
        args.input.display().to_string(),
    );

    debug!("Report: {} seconds of throughput, {} histogram buckets, {} summary rows",
           report.throughput.len(),
           report.distribution.bucket_count(),
           report.summary.len());

    // Step 5: Write
    info!("Step 5/5: Writing report...");
    write_report(&report, &args.output_json)
        .context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("LOAD TEST SUMMARY");
        println!("{}", "=".repeat(80));
        println!("{}", render_text_summary(&report));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Report completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Read target labels, one per line
///
/// **Public** - the line index is the target id, so blank lines are kept
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(|line| line.trim().to_string()).collect())
}

/// Validate report arguments
///
/// **Public** - can be called before execute_report for early validation
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input capture log path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Capture log not found: {}", args.input.display());
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if let Some(labels) = &args.labels {
        if !labels.is_file() {
            anyhow::bail!("Labels file not found: {}", labels.display());
        }
    }

    Ok(())
}
