//! Time-bucketed, multi-reducer aggregation over stored events.
//!
//! Every point of the requested event is bucketed by its absolute second
//! and folded into one accumulator per reducer. Points are applied in each
//! log's arrival order, targets in ascending id order, so reducers are
//! expected to be order-insensitive (counts, sums, collections).

use crate::store::{EventStore, Selection};
use log::debug;
use std::collections::BTreeMap;

/// Accumulated values keyed by absolute time in seconds
pub type TimeSeries<A> = BTreeMap<i64, A>;

/// A fold step: `(accumulator, relative time in ms) -> accumulator`
pub type Reducer<'a, A> = &'a dyn Fn(A, f64) -> A;

/// Aggregate one event into one time series per reducer
///
/// **Public** - main entry point for time-bucketed reduction
///
/// # Arguments
/// * `store` - Event store snapshot
/// * `selection` - Targets that participate
/// * `event` - Event name to aggregate (unknown names contribute nothing)
/// * `reducers` - Fold functions, applied independently
/// * `initial_values` - Seed per reducer. Empty means `A::default()` for
///   all of them; a shorter list is padded with its last value.
///
/// # Returns
/// One `second -> accumulator` map per reducer, in reducer order. Each
/// bucket is seeded with its own clone of the initial value, so
/// accumulators never alias across buckets or reducers.
pub fn aggregate<A>(
    store: &EventStore,
    selection: &Selection,
    event: &str,
    reducers: &[Reducer<'_, A>],
    initial_values: &[A],
) -> Vec<TimeSeries<A>>
where
    A: Clone + Default,
{
    let seeds = normalize_initial_values(reducers.len(), initial_values);
    let mut series: Vec<TimeSeries<A>> = reducers.iter().map(|_| BTreeMap::new()).collect();

    let mut applied = 0usize;
    for (_, log) in store.selected(selection) {
        for sample in log.event(event) {
            let bucket = sample.absolute_time_sec;
            for ((reducer, seed), buckets) in reducers.iter().zip(&seeds).zip(series.iter_mut()) {
                let slot = buckets.entry(bucket).or_insert_with(|| seed.clone());
                let acc = std::mem::take(slot);
                *slot = reducer(acc, sample.relative_time_ms);
            }
            applied += 1;
        }
    }

    debug!(
        "Aggregated {} '{}' points into {} reducer series (selection: {})",
        applied,
        event,
        reducers.len(),
        selection
    );

    series
}

/// Expand the supplied initial values to one seed per reducer
///
/// **Private** - internal helper for aggregate
fn normalize_initial_values<A>(reducer_count: usize, initial_values: &[A]) -> Vec<A>
where
    A: Clone + Default,
{
    let Some(last) = initial_values.last() else {
        return vec![A::default(); reducer_count];
    };

    (0..reducer_count)
        .map(|i| initial_values.get(i).unwrap_or(last).clone())
        .collect()
}

/// Count reducer: adds one per point
pub fn count(acc: f64, _value: f64) -> f64 {
    acc + 1.0
}

/// Sum reducer: adds the point's relative time
pub fn sum(acc: f64, value: f64) -> f64 {
    acc + value
}

/// Collecting reducer: keeps every relative time
pub fn collect(mut acc: Vec<f64>, value: f64) -> Vec<f64> {
    acc.push(value);
    acc
}

/// Flatten a collected series into one list, bucket by bucket
pub fn flatten(series: TimeSeries<Vec<f64>>) -> Vec<f64> {
    series.into_values().flatten().collect()
}

/// All relative times recorded for an event across the selection
///
/// Values come out grouped by second (ascending), arrival order within a
/// second.
pub fn collect_values(store: &EventStore, selection: &Selection, event: &str) -> Vec<f64> {
    let reducers: [Reducer<'_, Vec<f64>>; 1] = [&collect];
    aggregate(store, selection, event, &reducers, &[])
        .pop()
        .map(flatten)
        .unwrap_or_default()
}
