//! Append-only store of lifecycle points keyed by target and event name.
//!
//! Points arrive from asynchronous network callbacks, so a log for one
//! `(target, event)` pair is kept in arrival order. It is neither sorted by
//! time nor by iteration; consumers that need an order sort explicitly.

use super::selection::Selection;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Identifier of a configured target, fixed at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TargetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(TargetId)
    }
}

impl From<u32> for TargetId {
    fn from(id: u32) -> Self {
        TargetId(id)
    }
}

/// A single lifecycle point, as handed to [`EventStore::ingest`]
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementPoint {
    /// Target the call was made against
    pub target_id: TargetId,

    /// Lifecycle event name (e.g. `connectStart`, `callEnd`)
    pub event: String,

    /// Wall-clock time of the event, floored to whole seconds
    pub absolute_time_sec: i64,

    /// Milliseconds elapsed since the call started
    pub relative_time_ms: f64,

    /// Sequential call number for this target
    pub iteration: i64,
}

impl MeasurementPoint {
    /// Build a point from a millisecond epoch timestamp
    ///
    /// The timestamp is floored to seconds, which becomes the time bucket
    /// used by every aggregation.
    pub fn new(
        target_id: TargetId,
        event: impl Into<String>,
        time_ms: i64,
        relative_time_ms: f64,
        iteration: i64,
    ) -> Self {
        Self {
            target_id,
            event: event.into(),
            absolute_time_sec: time_ms.div_euclid(1000),
            relative_time_ms,
            iteration,
        }
    }
}

/// The part of a point that is stored under its `(target, event)` key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSample {
    pub absolute_time_sec: i64,
    pub relative_time_ms: f64,
    pub iteration: i64,
}

/// All event logs recorded for one target
#[derive(Debug, Clone, Default)]
pub struct TargetLog {
    events: HashMap<String, Vec<EventSample>>,
}

impl TargetLog {
    /// Samples recorded for an event, in arrival order
    ///
    /// Unknown event names yield an empty slice.
    pub fn event(&self, name: &str) -> &[EventSample] {
        self.events.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any sample was recorded under this event name
    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Names of every event recorded for this target
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Total number of samples across all events
    pub fn point_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    fn push(&mut self, event: String, sample: EventSample) {
        self.events.entry(event).or_default().push(sample);
    }
}

/// Owned store for one test run
///
/// Created empty at session start and cleared as a whole by [`reset`].
/// Targets iterate in ascending id order, which is the order every query
/// concatenates per-target results in.
///
/// [`reset`]: EventStore::reset
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    targets: BTreeMap<TargetId, TargetLog>,
}

impl EventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point to `log[target][event]`, creating both levels lazily
    ///
    /// Duplicate iterations are not detected.
    pub fn ingest(&mut self, point: MeasurementPoint) {
        let MeasurementPoint {
            target_id,
            event,
            absolute_time_sec,
            relative_time_ms,
            iteration,
        } = point;

        self.targets.entry(target_id).or_default().push(
            event,
            EventSample {
                absolute_time_sec,
                relative_time_ms,
                iteration,
            },
        );
    }

    /// Ingest every point from an iterator, returning how many were added
    pub fn ingest_all<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = MeasurementPoint>,
    {
        let mut added = 0;
        for point in points {
            self.ingest(point);
            added += 1;
        }
        debug!("Ingested {} points ({} targets)", added, self.targets.len());
        added
    }

    /// Drop every target's logs
    ///
    /// Takes `&mut self`, so no query can observe a partially cleared store.
    pub fn reset(&mut self) {
        info!(
            "Resetting event store ({} points across {} targets)",
            self.point_count(),
            self.targets.len()
        );
        self.targets = BTreeMap::new();
    }

    /// Check if nothing has been ingested since creation or the last reset
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Total number of stored points
    pub fn point_count(&self) -> usize {
        self.targets.values().map(TargetLog::point_count).sum()
    }

    /// Ids of every target with at least one point, ascending
    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys().copied()
    }

    /// Log of a single target, if anything was recorded for it
    pub fn target(&self, id: TargetId) -> Option<&TargetLog> {
        self.targets.get(&id)
    }

    /// Samples for one `(target, event)` pair in arrival order
    pub fn events(&self, id: TargetId, event: &str) -> &[EventSample] {
        self.targets.get(&id).map(|log| log.event(event)).unwrap_or(&[])
    }

    /// Logs of the targets matched by a selection, in ascending id order
    pub fn selected<'a>(
        &'a self,
        selection: &'a Selection,
    ) -> impl Iterator<Item = (TargetId, &'a TargetLog)> + 'a {
        self.targets
            .iter()
            .filter(move |(id, _)| selection.matches(**id))
            .map(|(id, log)| (*id, log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u32, event: &str, time_ms: i64, rel: f64, iteration: i64) -> MeasurementPoint {
        MeasurementPoint::new(TargetId(id), event, time_ms, rel, iteration)
    }

    #[test]
    fn test_ingest_creates_levels_lazily() {
        let mut store = EventStore::new();
        assert!(store.is_empty());

        store.ingest(point(3, "callEnd", 1_700_000_000_500, 120.0, 1));

        assert_eq!(store.target_count(), 1);
        let samples = store.events(TargetId(3), "callEnd");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].absolute_time_sec, 1_700_000_000);
        assert_eq!(samples[0].relative_time_ms, 120.0);
        assert!(store.events(TargetId(3), "dnsStart").is_empty());
        assert!(store.events(TargetId(9), "callEnd").is_empty());
    }

    #[test]
    fn test_arrival_order_is_kept() {
        let mut store = EventStore::new();
        store.ingest(point(1, "callEnd", 3_000, 30.0, 3));
        store.ingest(point(1, "callEnd", 1_000, 10.0, 1));
        store.ingest(point(1, "callEnd", 2_000, 20.0, 2));

        let iterations: Vec<i64> = store
            .events(TargetId(1), "callEnd")
            .iter()
            .map(|s| s.iteration)
            .collect();
        assert_eq!(iterations, vec![3, 1, 2]);
    }

    #[test]
    fn test_duplicate_iterations_are_accepted() {
        let mut store = EventStore::new();
        store.ingest(point(1, "callEnd", 1_000, 10.0, 1));
        store.ingest(point(1, "callEnd", 1_000, 12.0, 1));
        assert_eq!(store.events(TargetId(1), "callEnd").len(), 2);
    }

    #[test]
    fn test_absolute_time_is_floored() {
        assert_eq!(point(1, "x", 1_999, 0.0, 0).absolute_time_sec, 1);
        assert_eq!(point(1, "x", 2_000, 0.0, 0).absolute_time_sec, 2);
        assert_eq!(point(1, "x", -1, 0.0, 0).absolute_time_sec, -1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = EventStore::new();
        store.ingest_all(vec![
            point(1, "callEnd", 1_000, 10.0, 1),
            point(2, "callFailed", 1_000, 5.0, 1),
        ]);
        assert_eq!(store.point_count(), 2);

        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.point_count(), 0);
        assert!(store.events(TargetId(1), "callEnd").is_empty());
    }

    #[test]
    fn test_selected_iterates_in_id_order() {
        let mut store = EventStore::new();
        for id in [5, 1, 3] {
            store.ingest(point(id, "callEnd", 1_000, 1.0, 1));
        }

        let all: Vec<TargetId> = store.selected(&Selection::All).map(|(id, _)| id).collect();
        assert_eq!(all, vec![TargetId(1), TargetId(3), TargetId(5)]);

        let some = Selection::from_ids([TargetId(5), TargetId(3)]);
        let picked: Vec<TargetId> = store.selected(&some).map(|(id, _)| id).collect();
        assert_eq!(picked, vec![TargetId(3), TargetId(5)]);
    }

    #[test]
    fn test_target_id_from_str() {
        assert_eq!(" 7 ".parse::<TargetId>().unwrap(), TargetId(7));
        assert!("x".parse::<TargetId>().is_err());
    }
}
