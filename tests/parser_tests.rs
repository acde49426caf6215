use serde_json::json;
use webpecker_telemetry::parser::{parse_message, IngestPoint};
use webpecker_telemetry::store::{EventStore, MeasurementPoint, TargetId};

#[test]
fn test_ingest_point_wire_names() {
    let raw = json!({
        "id": 3,
        "iteration": 12,
        "event": "secureConnectEnd",
        "time": 1_700_000_123_456_i64,
        "msFromStart": 41
    });

    let point: IngestPoint = serde_json::from_value(raw).unwrap();
    assert_eq!(point.id, TargetId(3));
    assert_eq!(point.ms_from_start, 41.0);

    let measurement = MeasurementPoint::from(point);
    assert_eq!(measurement.absolute_time_sec, 1_700_000_123);
    assert_eq!(measurement.iteration, 12);
}

#[test]
fn test_string_and_integer_ids_are_the_same_target() {
    let mut store = EventStore::new();
    let batch = r#"[
        {"id":"5","iteration":1,"event":"callEnd","time":1000,"msFromStart":10},
        {"id":5,"iteration":2,"event":"callEnd","time":2000,"msFromStart":20}
    ]"#;

    store.ingest_all(parse_message(batch).unwrap());

    assert_eq!(store.target_count(), 1);
    assert_eq!(store.events(TargetId(5), "callEnd").len(), 2);
}

#[test]
fn test_messages_without_events_are_ignored() {
    let points = parse_message(r#"{"id":1,"state":"STOPPED"}"#).unwrap();
    assert!(points.is_empty());

    let points = parse_message("[]").unwrap();
    assert!(points.is_empty());
}

#[test]
fn test_negative_id_is_rejected() {
    assert!(parse_message(r#"{"id":-1,"iteration":1,"event":"callEnd","time":1,"msFromStart":1}"#).is_err());
}

#[test]
fn test_point_without_iteration_is_rejected() {
    let batch = r#"[
        {"id":1,"iteration":1,"event":"callEnd","time":1000,"msFromStart":10},
        {"id":1,"event":"callEnd","time":2000,"msFromStart":20}
    ]"#;

    assert!(parse_message(batch).is_err());
}
