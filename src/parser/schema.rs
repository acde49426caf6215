//! Output JSON schema definitions for telemetry reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{
    response_time_distribution, stage_breakdown, summary_stats_for, throughput, Histogram,
    StageBreakdown, TargetSummary, ThroughputBucket,
};
use crate::store::{EventStore, Selection};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Where the points came from (capture log path)
    pub source: String,

    /// Targets the charts were computed for
    pub selection: Selection,

    /// Number of points in the store when the report was built
    pub total_points: usize,

    /// Successful/failed calls and mean response time per second
    pub throughput: Vec<ThroughputBucket>,

    /// Response time distribution
    pub distribution: Histogram<String>,

    /// Stage waterfall
    pub stages: StageBreakdown,

    /// Summary table, one row per target
    pub summary: Vec<TargetSummary>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

impl Report {
    /// Run every query against the store and collect the results
    ///
    /// **Public** - one dashboard refresh, frozen into a report
    ///
    /// The summary table covers the selected targets only; `labels` are
    /// indexed by target id.
    pub fn build(
        store: &EventStore,
        selection: &Selection,
        labels: &[String],
        source: impl Into<String>,
    ) -> Self {
        Report {
            version: SCHEMA_VERSION.to_string(),
            source: source.into(),
            selection: selection.clone(),
            total_points: store.point_count(),
            throughput: throughput(store, selection),
            distribution: response_time_distribution(store, selection),
            stages: stage_breakdown(store, selection),
            summary: summary_stats_for(store, selection, labels),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Total successful calls across all throughput buckets
    pub fn successful_calls(&self) -> u64 {
        self.throughput.iter().map(|b| b.successful).sum()
    }

    /// Total failed calls across all throughput buckets
    pub fn failed_calls(&self) -> u64 {
        self.throughput.iter().map(|b| b.failed).sum()
    }
}
