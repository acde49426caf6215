//! Decoding of transport messages into measurement points.
//!
//! The backend flushes its buffer as a JSON array of messages; a single
//! object is accepted too. Only messages carrying an `event` are lifecycle
//! points. Target state updates and iteration results share the channel
//! and are skipped here.

use crate::store::{MeasurementPoint, TargetId};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A lifecycle point as it appears on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestPoint {
    /// Target id, as an integer or an integer string
    #[serde(deserialize_with = "deserialize_target_id")]
    pub id: TargetId,

    /// Event name reported by the HTTP client
    pub event: String,

    /// Wall-clock time in milliseconds since the epoch
    pub time: i64,

    /// Milliseconds since the call started
    pub ms_from_start: f64,

    /// Call number for this target, required to pair stage events
    pub iteration: i64,
}

impl From<IngestPoint> for MeasurementPoint {
    fn from(point: IngestPoint) -> Self {
        MeasurementPoint::new(
            point.id,
            point.event,
            point.time,
            point.ms_from_start,
            point.iteration,
        )
    }
}

/// Accept `1` as well as `"1"` for target ids
///
/// **Private** - serde helper for IngestPoint
fn deserialize_target_id<'de, D>(deserializer: D) -> Result<TargetId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u32),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(id) => Ok(TargetId(id)),
        RawId::Str(s) => s
            .parse::<TargetId>()
            .map_err(|_| serde::de::Error::custom(ParseError::InvalidTargetId(s))),
    }
}

/// Decode one transport message into its measurement points
///
/// **Public** - one call per received message
///
/// # Errors
/// * `ParseError::JsonError` - the message is not JSON, or an object with
///   an `event` field does not have the point shape
pub fn parse_message(message: &str) -> Result<Vec<MeasurementPoint>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(message)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    let mut points = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        if item.get("event").is_none() {
            skipped += 1;
            continue;
        }
        let point: IngestPoint = serde_json::from_value(item)?;
        points.push(point.into());
    }

    if skipped > 0 {
        debug!("Skipped {} non-event messages", skipped);
    }

    Ok(points)
}

/// Read a newline-delimited capture log of transport messages
///
/// **Public** - replays a recorded session
///
/// Blank lines are ignored.
///
/// # Errors
/// * `ParseError::IoError` - the file cannot be read
/// * `ParseError::InvalidLine` - a line is not a valid message
pub fn read_capture_log(path: impl AsRef<Path>) -> Result<Vec<MeasurementPoint>, ParseError> {
    let path = path.as_ref();
    debug!("Reading capture log from: {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let mut points = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(mut batch) => points.append(&mut batch),
            Err(ParseError::JsonError(source)) => {
                warn!("Malformed message on line {}", index + 1);
                return Err(ParseError::InvalidLine {
                    line: index + 1,
                    source,
                });
            }
            Err(other) => return Err(other),
        }
    }

    debug!("Capture log contained {} points", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_object() {
        let points = parse_message(
            r#"{"id":2,"iteration":7,"event":"dnsStart","time":1700000001999,"msFromStart":3}"#,
        )
        .unwrap();

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.target_id, TargetId(2));
        assert_eq!(point.event, "dnsStart");
        assert_eq!(point.absolute_time_sec, 1_700_000_001);
        assert_eq!(point.relative_time_ms, 3.0);
        assert_eq!(point.iteration, 7);
    }

    #[test]
    fn test_batch_skips_state_messages() {
        let message = r#"[
            {"id":1,"state":"RUNNING"},
            {"id":"1","iteration":1,"event":"callEnd","time":1000,"msFromStart":120},
            {"id":1,"iteration":1,"result":"OK"}
        ]"#;

        let points = parse_message(message).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].target_id, TargetId(1));
        assert_eq!(points[0].event, "callEnd");
    }

    #[test]
    fn test_invalid_messages() {
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"id":"abc","iteration":1,"event":"callEnd","time":1,"msFromStart":1}"#).is_err());
        assert!(parse_message(r#"{"id":1,"event":"callEnd"}"#).is_err());
        assert!(parse_message(r#"{"id":1,"event":"callEnd","time":1,"msFromStart":1}"#).is_err());
    }

    #[test]
    fn test_read_capture_log() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":1,"iteration":1,"event":"callEnd","time":1000,"msFromStart":10}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"[{{"id":2,"iteration":1,"event":"callFailed","time":2000,"msFromStart":5}}]"#).unwrap();

        let points = read_capture_log(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].event, "callFailed");
    }

    #[test]
    fn test_read_capture_log_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":1,"iteration":1,"event":"callEnd","time":1000,"msFromStart":10}}"#).unwrap();
        writeln!(file, "{{broken").unwrap();

        match read_capture_log(file.path()) {
            Err(ParseError::InvalidLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected InvalidLine, got {:?}", other),
        }
    }
}
