//! Webpecker Telemetry
//!
//! Aggregation engine for the webpecker load-testing dashboard.
//!
//! The load generator streams one lifecycle point per HTTP client callback
//! (`dnsStart`, `connectEnd`, `callEnd`, ...). This crate stores those
//! points for the current run and derives everything the dashboard draws:
//! throughput series, latency histograms, stage waterfalls and summary
//! statistics.
//!
//! ## Getting Started
//!
//! ```
//! use webpecker_telemetry::aggregator::{stage_durations, summary_stats};
//! use webpecker_telemetry::store::{EventStore, MeasurementPoint, Selection, TargetId};
//!
//! let mut store = EventStore::new();
//! store.ingest(MeasurementPoint::new(TargetId(0), "connectStart", 1_000, 10.0, 1));
//! store.ingest(MeasurementPoint::new(TargetId(0), "connectEnd", 1_015, 15.0, 1));
//! store.ingest(MeasurementPoint::new(TargetId(0), "callEnd", 1_120, 120.0, 1));
//!
//! assert_eq!(stage_durations(&store, &Selection::All, "connect"), vec![5.0]);
//! assert_eq!(summary_stats(&store, &[])[0].mean, Some(120));
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod store;
pub mod utils;
