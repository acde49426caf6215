//! Per-second throughput and response time series.

use super::metrics::round_half_up;
use super::reduce::{aggregate, count, sum, Reducer};
use crate::store::{EventStore, Selection};
use crate::utils::config::{CALL_END_EVENT, CALL_FAILED_EVENT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calls completed during one wall-clock second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputBucket {
    /// Absolute time of the bucket in seconds since the epoch
    pub time_sec: i64,

    /// Same instant as RFC 3339, for readers of the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    pub successful: u64,
    pub failed: u64,

    /// Rounded mean response time of the successful calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_response_ms: Option<i64>,
}

/// Successful and failed calls per second, with mean response time
///
/// **Public** - feeds the throughput chart
///
/// Every second seen in either `callEnd` or `callFailed` gets a bucket.
/// The mean is only present when the second has successful calls.
pub fn throughput(store: &EventStore, selection: &Selection) -> Vec<ThroughputBucket> {
    let success_reducers: [Reducer<'_, f64>; 2] = [&count, &sum];
    let mut success = aggregate(store, selection, CALL_END_EVENT, &success_reducers, &[0.0]);
    let response_sum = success.pop().unwrap_or_default();
    let successful = success.pop().unwrap_or_default();

    let failure_reducers: [Reducer<'_, f64>; 1] = [&count];
    let failed = aggregate(store, selection, CALL_FAILED_EVENT, &failure_reducers, &[0.0])
        .pop()
        .unwrap_or_default();

    let seconds: BTreeSet<i64> = successful.keys().chain(failed.keys()).copied().collect();

    seconds
        .into_iter()
        .map(|t| {
            let ok = successful.get(&t).copied().unwrap_or(0.0);
            let mean_response_ms = if ok > 0.0 {
                response_sum.get(&t).map(|total| round_half_up(total / ok))
            } else {
                None
            };

            ThroughputBucket {
                time_sec: t,
                timestamp: DateTime::<Utc>::from_timestamp(t, 0).map(|dt| dt.to_rfc3339()),
                successful: ok as u64,
                failed: failed.get(&t).copied().unwrap_or(0.0) as u64,
                mean_response_ms,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MeasurementPoint, TargetId};

    #[test]
    fn test_union_of_seconds() {
        let mut store = EventStore::new();
        store.ingest(MeasurementPoint::new(TargetId(1), "callEnd", 5_000, 100.0, 1));
        store.ingest(MeasurementPoint::new(TargetId(1), "callEnd", 5_500, 201.0, 2));
        store.ingest(MeasurementPoint::new(TargetId(2), "callFailed", 5_200, 30.0, 1));
        store.ingest(MeasurementPoint::new(TargetId(2), "callFailed", 7_000, 30.0, 2));

        let buckets = throughput(&store, &Selection::All);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].time_sec, 5);
        assert_eq!(buckets[0].successful, 2);
        assert_eq!(buckets[0].failed, 1);
        assert_eq!(buckets[0].mean_response_ms, Some(151));
        assert_eq!(buckets[0].timestamp.as_deref(), Some("1970-01-01T00:00:05+00:00"));

        assert_eq!(buckets[1].time_sec, 7);
        assert_eq!(buckets[1].successful, 0);
        assert_eq!(buckets[1].failed, 1);
        assert_eq!(buckets[1].mean_response_ms, None);
    }

    #[test]
    fn test_empty_store() {
        assert!(throughput(&EventStore::new(), &Selection::All).is_empty());
    }
}
