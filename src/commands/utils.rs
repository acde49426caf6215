use anyhow::Result;
use std::path::PathBuf;
use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    if report.version != SCHEMA_VERSION {
        log::warn!("Report schema v{} differs from current v{}", report.version, SCHEMA_VERSION);
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source);
    println!("  Points: {}", report.total_points);
    println!("  Calls: {} ok / {} failed", report.successful_calls(), report.failed_calls());
    println!("  Targets: {}", report.summary.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Webpecker Telemetry Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  source: string           - Capture log the points came from");
        println!("  selection: string|object - Targets included ('all', one, many)");
        println!("  total_points: number     - Points in the store");
        println!("  throughput: array        - Calls per second");
        println!("    time_sec: number       - Absolute second");
        println!("    successful: number     - callEnd count");
        println!("    failed: number         - callFailed count");
        println!("    mean_response_ms: number? - Mean of successful calls");
        println!("  distribution: object     - Response time histogram");
        println!("    bucket_labels: array   - 'lo - hi' per bucket");
        println!("    counts: object         - Counts per series");
        println!("  stages: object           - Stage waterfall");
        println!("    stages: array          - name, offset_ms, mean_ms, count");
        println!("  summary: array           - Per-target statistics");
        println!("    id, url?, count, count_error, mean?, median?, trimmed_mean?");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Webpecker Telemetry v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Telemetry aggregation for the webpecker load-testing dashboard.");
}
