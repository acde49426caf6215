//! Per-target descriptive statistics for the summary table.
//!
//! Response times come from `callEnd`, failures from `callFailed`. All
//! statistics resolve to `None` on empty input instead of failing.

use super::reduce::collect_values;
use crate::store::{EventStore, Selection, TargetId};
use crate::utils::config::{CALL_END_EVENT, CALL_FAILED_EVENT, DEFAULT_TRIM_PERCENT};
use log::debug;
use serde::{Deserialize, Serialize};

/// Result of a trimmed mean over a non-empty input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimmedMean {
    /// Rounded mean of the values left after trimming
    Mean(i64),

    /// Trimming removed every value
    FullyTrimmed,
}

impl TrimmedMean {
    pub fn value(self) -> Option<i64> {
        match self {
            TrimmedMean::Mean(v) => Some(v),
            TrimmedMean::FullyTrimmed => None,
        }
    }
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub id: TargetId,

    /// Label configured for this target (usually its URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Number of successful calls
    pub count: usize,

    /// Number of failed calls
    pub count_error: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimmed_mean: Option<TrimmedMean>,
}

/// Round to the nearest integer, halves towards positive infinity
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Rounded arithmetic mean, `None` for empty input
pub fn mean(values: &[f64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    Some(round_half_up(values.iter().sum::<f64>() / values.len() as f64))
}

/// Median of the values
///
/// Even counts average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted(values);
    let half = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[half])
    } else {
        Some((sorted[half - 1] + sorted[half]) / 2.0)
    }
}

/// Mean after dropping `trim_percent / 2` percent of values from each end
///
/// # Returns
/// * `None` - empty input
/// * `Some(TrimmedMean::FullyTrimmed)` - nothing left after trimming
/// * `Some(TrimmedMean::Mean(v))` - rounded mean of the remainder
pub fn trimmed_mean(values: &[f64], trim_percent: f64) -> Option<TrimmedMean> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted(values);
    let trim_count = (sorted.len() as f64 * ((trim_percent / 2.0) * 0.01)).floor() as usize;
    if trim_count * 2 >= sorted.len() {
        return Some(TrimmedMean::FullyTrimmed);
    }

    let kept = &sorted[trim_count..sorted.len() - trim_count];
    Some(match mean(kept) {
        Some(v) => TrimmedMean::Mean(v),
        None => TrimmedMean::FullyTrimmed,
    })
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Build a summary row from a target's samples
///
/// **Public** - pure computation, usable without a store
pub fn summarize(
    id: TargetId,
    url: Option<String>,
    response_times: &[f64],
    failures: &[f64],
) -> TargetSummary {
    TargetSummary {
        id,
        url,
        count: response_times.len(),
        count_error: failures.len(),
        mean: mean(response_times),
        median: median(response_times),
        trimmed_mean: trimmed_mean(response_times, DEFAULT_TRIM_PERCENT),
    }
}

/// Summary rows for every target in the store
///
/// **Public** - main entry point for the summary table
///
/// # Arguments
/// * `store` - Event store snapshot
/// * `labels` - Target labels indexed by target id; missing entries leave
///   `url` empty
pub fn summary_stats(store: &EventStore, labels: &[String]) -> Vec<TargetSummary> {
    summary_stats_for(store, &Selection::All, labels)
}

/// Summary rows for the selected targets, in ascending id order
pub fn summary_stats_for(
    store: &EventStore,
    selection: &Selection,
    labels: &[String],
) -> Vec<TargetSummary> {
    let rows: Vec<TargetSummary> = store
        .selected(selection)
        .map(|(id, _)| {
            let single = Selection::One(id);
            let response_times = collect_values(store, &single, CALL_END_EVENT);
            let failures = collect_values(store, &single, CALL_FAILED_EVENT);
            let url = labels.get(id.0 as usize).cloned();
            summarize(id, url, &response_times, &failures)
        })
        .collect();

    debug!("Computed summary for {} targets", rows.len());
    rows
}
