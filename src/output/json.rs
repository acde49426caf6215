//! JSON persistence of reports.
//!
//! Reports are written pretty-printed so they diff well between runs.
//! Reading checks the schema major version and the generation timestamp,
//! so a file from an incompatible release is refused instead of being
//! half-deserialized.

use crate::parser::schema::Report;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::DateTime;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Serialize a report to a pretty JSON string
pub fn report_to_string(report: &Report) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write a report to `output_path`, creating missing parent directories
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path, or the path is a directory
/// * `OutputError::WriteFailed` - the file or its parents cannot be created
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = output_path.as_ref();

    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = report_to_string(report)?;
    fs::write(path, &json)?;

    info!(
        "Report with {} targets and {} throughput buckets written to {} ({} bytes)",
        report.summary.len(),
        report.throughput.len(),
        path.display(),
        json.len()
    );

    Ok(())
}

/// Read a report written by [`write_report`]
///
/// # Errors
/// * `OutputError::WriteFailed` - the file cannot be read
/// * `OutputError::SerializationFailed` - not a report
/// * `OutputError::IncompatibleReport` - different schema major version, or
///   `generated_at` is not an RFC 3339 timestamp
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let path = input_path.as_ref();
    debug!("Reading report from: {}", path.display());

    let report: Report = serde_json::from_str(&fs::read_to_string(path)?)?;
    check_compatible(&report)?;

    debug!(
        "Report v{} loaded: {} points from {}",
        report.version, report.total_points, report.source
    );
    Ok(report)
}

/// Refuse reports this release cannot interpret
///
/// **Private** - internal helper for read_report
fn check_compatible(report: &Report) -> Result<(), OutputError> {
    let major = |version: &str| version.split('.').next().unwrap_or_default().to_string();
    if major(&report.version) != major(SCHEMA_VERSION) {
        return Err(OutputError::IncompatibleReport(format!(
            "schema v{} cannot be read by v{}",
            report.version, SCHEMA_VERSION
        )));
    }

    DateTime::parse_from_rfc3339(&report.generated_at).map_err(|e| {
        OutputError::IncompatibleReport(format!(
            "generated_at {:?} is not RFC 3339: {}",
            report.generated_at, e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EventStore, MeasurementPoint, Selection, TargetId};
    use tempfile::tempdir;

    fn sample_report() -> Report {
        let mut store = EventStore::new();
        for (i, rel) in [100.0, 150.0, 200.0].into_iter().enumerate() {
            store.ingest(MeasurementPoint::new(TargetId(0), "callEnd", 1_000, rel, i as i64 + 1));
        }
        Report::build(&store, &Selection::All, &["/health".to_string()], "capture.log")
    }

    #[test]
    fn test_round_trip_keeps_version_and_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report();

        write_report(&report, &path).unwrap();
        let loaded = read_report(&path).unwrap();

        assert_eq!(loaded, report);
        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert!(DateTime::parse_from_rfc3339(&loaded.generated_at).is_ok());
    }

    #[test]
    fn test_report_to_string() {
        let json = report_to_string(&sample_report()).unwrap();
        assert!(json.contains("\"total_points\": 3"));
        assert!(json.contains("\"url\": \"/health\""));
    }

    #[test]
    fn test_rejects_empty_and_directory_paths() {
        let report = sample_report();
        let dir = tempdir().unwrap();

        assert!(matches!(write_report(&report, ""), Err(OutputError::InvalidPath(_))));
        assert!(matches!(write_report(&report, dir.path()), Err(OutputError::InvalidPath(_))));
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs/2024/report.json");

        write_report(&sample_report(), &nested).unwrap();
        assert!(nested.is_file());
    }

    #[test]
    fn test_refuses_other_major_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.json");
        let mut report = sample_report();
        report.version = "0.9.0".to_string();
        write_report(&report, &path).unwrap();

        assert!(matches!(read_report(&path), Err(OutputError::IncompatibleReport(_))));
    }

    #[test]
    fn test_refuses_bad_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut report = sample_report();
        report.generated_at = "yesterday".to_string();
        write_report(&report, &path).unwrap();

        assert!(matches!(read_report(&path), Err(OutputError::IncompatibleReport(_))));
    }
}
