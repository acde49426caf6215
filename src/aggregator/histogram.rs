//! Shared-bucket histograms over one or more sample series.
//!
//! All series are bucketed against the same global range so they can be
//! drawn on one axis. The bucket count follows the square-root rule on the
//! longest series.

use super::metrics::round_half_up;
use super::reduce::collect_values;
use crate::store::{EventStore, Selection};
use crate::utils::config::{CALL_END_EVENT, TOTAL_SERIES};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket labels plus per-series counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram<K: Ord> {
    /// One `"lo - hi"` label per bucket, ascending
    pub bucket_labels: Vec<String>,

    /// Counts per series, each exactly `bucket_labels.len()` long
    pub counts: BTreeMap<K, Vec<u64>>,
}

impl<K: Ord> Histogram<K> {
    pub fn bucket_count(&self) -> usize {
        self.bucket_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bucket_labels.is_empty()
    }
}

/// Build a histogram shared by every series
///
/// **Public** - main entry point for distributions
///
/// # Algorithm
/// 1. `bucket_count = ceil(sqrt(longest series))`, at least 1
/// 2. Range is the global min/max over all samples
/// 3. Index is `floor((v - min) / size)`, clamped so the maximum lands in
///    the last bucket
///
/// With no samples at all the histogram has no buckets (each series maps
/// to an empty vector). When every sample is equal there is one bucket.
pub fn histogram<K>(series: &BTreeMap<K, Vec<f64>>) -> Histogram<K>
where
    K: Ord + Clone,
{
    let Some((min, max)) = global_range(series) else {
        return Histogram {
            bucket_labels: Vec::new(),
            counts: series.keys().map(|k| (k.clone(), Vec::new())).collect(),
        };
    };

    let max_len = series.values().map(Vec::len).max().unwrap_or(0).max(1);
    let bucket_count = if max == min {
        1
    } else {
        ((max_len as f64).sqrt().ceil() as usize).max(1)
    };
    let bucket_size = (max - min) / bucket_count as f64;

    let bucket_labels = (0..bucket_count)
        .map(|i| {
            let lo = min + i as f64 * bucket_size;
            let hi = min + (i + 1) as f64 * bucket_size;
            format!(
                "{} - {}",
                smart_decimal(lo, bucket_size),
                smart_decimal(hi, bucket_size)
            )
        })
        .collect();

    let counts = series
        .iter()
        .map(|(key, values)| {
            let mut buckets = vec![0u64; bucket_count];
            for &value in values {
                buckets[bucket_index(value, min, bucket_size, bucket_count)] += 1;
            }
            (key.clone(), buckets)
        })
        .collect();

    debug!(
        "Built histogram: {} series, {} buckets of {:.3} over [{}, {}]",
        series.len(),
        bucket_count,
        bucket_size,
        min,
        max
    );

    Histogram {
        bucket_labels,
        counts,
    }
}

/// Global `(min, max)` over every sample, `None` if there are none
///
/// **Private** - internal helper for histogram
fn global_range<K>(series: &BTreeMap<K, Vec<f64>>) -> Option<(f64, f64)> {
    series
        .values()
        .flatten()
        .fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Bucket for a value, clamped to the last bucket
///
/// **Private** - internal helper for histogram
fn bucket_index(value: f64, min: f64, bucket_size: f64, bucket_count: usize) -> usize {
    if bucket_size <= 0.0 {
        return 0;
    }
    let index = ((value - min) / bucket_size).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(bucket_count - 1)
    }
}

/// Format a bucket boundary with precision fitting the bucket width
///
/// Two decimals below 0.2, one below 5, whole numbers otherwise, judged
/// on the smaller of the value and the bucket size.
pub fn smart_decimal(value: f64, bucket_size: f64) -> String {
    let scale = value.min(bucket_size);
    if scale < 0.2 {
        format!("{:.2}", value)
    } else if scale < 5.0 {
        format!("{:.1}", value)
    } else {
        round_half_up(value).to_string()
    }
}

/// Response time distribution for the selected targets
///
/// **Public** - feeds the distribution chart
///
/// `All` yields a single `Total` series; otherwise there is one series per
/// selected target, keyed by its id.
pub fn response_time_distribution(store: &EventStore, selection: &Selection) -> Histogram<String> {
    let series: BTreeMap<String, Vec<f64>> = selection
        .split()
        .into_iter()
        .map(|single| {
            let key = match &single {
                Selection::All => TOTAL_SERIES.to_string(),
                other => other.to_string(),
            };
            (key, collect_values(store, &single, CALL_END_EVENT))
        })
        .collect();

    histogram(&series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, &[f64])]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_square_root_bucket_count() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let hist = histogram(&series(&[("a", &values)]));

        // ceil(sqrt(10)) = 4 buckets of 2.25
        assert_eq!(hist.bucket_count(), 4);
        assert_eq!(hist.counts["a"], vec![3, 2, 2, 3]);
        assert_eq!(hist.counts["a"].iter().sum::<u64>(), 10);
    }

    #[test]
    fn test_maximum_lands_in_last_bucket() {
        let hist = histogram(&series(&[("a", &[0.0, 10.0, 20.0, 30.0])]));
        assert_eq!(hist.bucket_count(), 2);
        assert_eq!(hist.counts["a"], vec![2, 2]);
    }

    #[test]
    fn test_series_share_buckets() {
        let hist = histogram(&series(&[
            ("fast", &[10.0, 12.0, 11.0, 10.0]),
            ("slow", &[100.0]),
        ]));

        assert_eq!(hist.bucket_count(), 2);
        assert_eq!(hist.counts["fast"], vec![4, 0]);
        assert_eq!(hist.counts["slow"], vec![0, 1]);
        assert_eq!(hist.bucket_labels, vec!["10 - 55", "55 - 100"]);
    }

    #[test]
    fn test_equal_values_single_bucket() {
        let hist = histogram(&series(&[("a", &[7.0, 7.0, 7.0])]));
        assert_eq!(hist.bucket_count(), 1);
        assert_eq!(hist.counts["a"], vec![3]);
        assert_eq!(hist.bucket_labels, vec!["7.00 - 7.00"]);
    }

    #[test]
    fn test_empty_input() {
        let hist = histogram(&series(&[("a", &[]), ("b", &[])]));
        assert!(hist.is_empty());
        assert_eq!(hist.counts["a"], Vec::<u64>::new());

        let none: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        assert!(histogram(&none).counts.is_empty());
    }

    #[test]
    fn test_smart_decimal() {
        assert_eq!(smart_decimal(0.1234, 10.0), "0.12");
        assert_eq!(smart_decimal(12.0, 0.1), "12.00");
        assert_eq!(smart_decimal(3.26, 10.0), "3.3");
        assert_eq!(smart_decimal(12.34, 4.0), "12.3");
        assert_eq!(smart_decimal(12.5, 6.0), "13");
    }
}
