//! Stage duration matching and the stage waterfall.
//!
//! The HTTP client reports `<stage>Start`, `<stage>End` and `<stage>Failed`
//! as independent callbacks. The only thing tying a start to its completion
//! is the iteration number, and callbacks arrive out of order, so durations
//! are reconstructed by walking starts against iteration-sorted completions.

use super::metrics::round_half_up;
use super::reduce::collect_values;
use crate::store::{EventSample, EventStore, Selection, TargetLog};
use crate::utils::config::{
    STAGE_END_SUFFIX, STAGE_FAILED_SUFFIX, STAGE_START_SUFFIX, TTFB_EVENT, TTFB_ROW,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A named phase of one call's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ProxySelect,
    Dns,
    Connect,
    SecureConnect,
    ResponseHeaders,
    ResponseBody,
}

impl Stage {
    /// Every stage reported by the HTTP client, in lifecycle order
    pub const ALL: [Stage; 6] = [
        Stage::ProxySelect,
        Stage::Dns,
        Stage::Connect,
        Stage::SecureConnect,
        Stage::ResponseHeaders,
        Stage::ResponseBody,
    ];

    /// Event name prefix used on the wire
    pub fn name(self) -> &'static str {
        match self {
            Stage::ProxySelect => "proxySelect",
            Stage::Dns => "dns",
            Stage::Connect => "connect",
            Stage::SecureConnect => "secureConnect",
            Stage::ResponseHeaders => "responseHeaders",
            Stage::ResponseBody => "responseBody",
        }
    }

    pub fn start_event(self) -> String {
        format!("{}{}", self.name(), STAGE_START_SUFFIX)
    }

    pub fn end_event(self) -> String {
        format!("{}{}", self.name(), STAGE_END_SUFFIX)
    }

    pub fn failed_event(self) -> String {
        format!("{}{}", self.name(), STAGE_FAILED_SUFFIX)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}

/// Outcome carried by a completion event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

/// A stage completion tagged with how the stage ended
#[derive(Debug, Clone, Copy)]
struct Completion {
    iteration: i64,
    relative_time_ms: f64,
    outcome: Outcome,
}

impl Completion {
    fn tagged(sample: &EventSample, outcome: Outcome) -> Self {
        Self {
            iteration: sample.iteration,
            relative_time_ms: sample.relative_time_ms,
            outcome,
        }
    }
}

/// Durations (ms) of every matched, successful stage execution
///
/// **Public** - main entry point for stage latency
///
/// # Arguments
/// * `store` - Event store snapshot
/// * `selection` - Targets that participate
/// * `stage` - Stage name prefix (e.g. `"connect"`); any name is accepted,
///   unknown ones simply have no events
///
/// # Returns
/// Strictly positive durations, concatenated per target in ascending id
/// order.
///
/// # Matching
/// Completions (`End` as success, `Failed` as failure) are sorted by
/// iteration, then relative time. Starts are walked in arrival order with a
/// cursor into that list: completions of earlier iterations are skipped,
/// the one under the cursor is consumed by the start, and only successful
/// completions later than the start produce a sample. Once the cursor runs
/// out, the remaining starts of that target are dropped.
///
/// This assumes one completion per start and starts arriving in iteration
/// order. Duplicate iterations or out-of-order starts lose samples silently.
pub fn stage_durations(store: &EventStore, selection: &Selection, stage: &str) -> Vec<f64> {
    let start_event = format!("{}{}", stage, STAGE_START_SUFFIX);
    let end_event = format!("{}{}", stage, STAGE_END_SUFFIX);
    let failed_event = format!("{}{}", stage, STAGE_FAILED_SUFFIX);

    let mut durations = Vec::new();
    for (id, log) in store.selected(selection) {
        let before = durations.len();
        match_target(log, &start_event, &end_event, &failed_event, &mut durations);
        debug!(
            "Stage '{}' for target {}: {} samples",
            stage,
            id,
            durations.len() - before
        );
    }

    durations
}

/// Match one target's starts against its completions
///
/// **Private** - internal helper for stage_durations
fn match_target(
    log: &TargetLog,
    start_event: &str,
    end_event: &str,
    failed_event: &str,
    durations: &mut Vec<f64>,
) {
    let mut completions: Vec<Completion> = log
        .event(end_event)
        .iter()
        .map(|s| Completion::tagged(s, Outcome::Success))
        .chain(
            log.event(failed_event)
                .iter()
                .map(|s| Completion::tagged(s, Outcome::Failure)),
        )
        .collect();

    completions.sort_by(|a, b| {
        a.iteration.cmp(&b.iteration).then_with(|| {
            a.relative_time_ms
                .partial_cmp(&b.relative_time_ms)
                .unwrap_or(Ordering::Equal)
        })
    });

    let mut cursor = 0;
    for start in log.event(start_event) {
        while cursor < completions.len() && completions[cursor].iteration < start.iteration {
            cursor += 1;
        }

        let Some(candidate) = completions.get(cursor) else {
            break;
        };

        if candidate.outcome == Outcome::Success
            && candidate.relative_time_ms > start.relative_time_ms
        {
            durations.push(candidate.relative_time_ms - start.relative_time_ms);
        }

        cursor += 1;
    }
}

/// One row of the stage waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBar {
    /// Row label (stage name, or `TTFB`)
    pub name: String,

    /// Where the bar starts, relative to the start of the call (ms)
    pub offset_ms: i64,

    /// Rounded mean duration (ms), 0 without samples
    pub mean_ms: i64,

    /// Number of samples behind the mean
    pub count: usize,
}

/// Average duration of every stage laid out as a waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBreakdown {
    pub stages: Vec<StageBar>,
}

impl StageBreakdown {
    pub fn get(&self, name: &str) -> Option<&StageBar> {
        self.stages.iter().find(|bar| bar.name == name)
    }
}

/// Build the stage waterfall for a selection
///
/// **Public** - feeds the stage breakdown chart
///
/// Rows are `proxySelect, dns, connect, secureConnect, TTFB,
/// responseHeaders, responseBody`. TTFB averages the relative times of
/// `responseHeadersStart`; every other row averages [`stage_durations`].
///
/// Offsets chain the connection phases one after another, except TLS
/// which ends together with `connect`. The response phases start over from
/// zero at TTFB.
pub fn stage_breakdown(store: &EventStore, selection: &Selection) -> StageBreakdown {
    let rows: Vec<(String, Vec<f64>)> = [
        Stage::ProxySelect,
        Stage::Dns,
        Stage::Connect,
        Stage::SecureConnect,
    ]
    .into_iter()
    .map(|stage| (stage.name().to_string(), stage_durations(store, selection, stage.name())))
    .chain(std::iter::once((
        TTFB_ROW.to_string(),
        collect_values(store, selection, TTFB_EVENT),
    )))
    .chain(
        [Stage::ResponseHeaders, Stage::ResponseBody]
            .into_iter()
            .map(|stage| (stage.name().to_string(), stage_durations(store, selection, stage.name()))),
    )
    .collect();

    let means: Vec<(String, i64, usize)> = rows
        .into_iter()
        .map(|(name, samples)| {
            let mean = if samples.is_empty() {
                0
            } else {
                round_half_up(samples.iter().sum::<f64>() / samples.len() as f64)
            };
            (name, mean, samples.len())
        })
        .collect();

    let d: Vec<i64> = means.iter().map(|(_, mean, _)| *mean).collect();
    let mut offsets = [0i64; 7];
    offsets[1] = d[0];
    offsets[2] = offsets[1] + d[1];
    offsets[3] = offsets[2] + d[2] - d[3];
    offsets[4] = 0;
    offsets[5] = d[4];
    offsets[6] = offsets[5] + d[5];

    StageBreakdown {
        stages: means
            .into_iter()
            .zip(offsets)
            .map(|((name, mean_ms, count), offset_ms)| StageBar {
                name,
                offset_ms,
                mean_ms,
                count,
            })
            .collect(),
    }
}
