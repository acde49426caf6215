//! Aggregation of stored lifecycle events into chart-ready results.
//!
//! This module turns the raw event store into:
//! - Time-bucketed reductions (throughput, response time series)
//! - Stage durations and the stage waterfall
//! - Shared-bucket latency histograms
//! - Per-target summary statistics
//!
//! Every query is a pure function of the store snapshot. Nothing is cached
//! between calls; callers diff against their previous render themselves.

pub mod histogram;
pub mod metrics;
pub mod reduce;
pub mod stages;
pub mod throughput;

// Re-export main types and functions
pub use histogram::{histogram, response_time_distribution, Histogram};
pub use metrics::{median, summary_stats, summary_stats_for, trimmed_mean, TargetSummary, TrimmedMean};
pub use reduce::{aggregate, collect_values, Reducer, TimeSeries};
pub use stages::{stage_breakdown, stage_durations, Stage, StageBar, StageBreakdown};
pub use throughput::{throughput, ThroughputBucket};
