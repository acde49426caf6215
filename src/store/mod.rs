//! In-memory storage of lifecycle events for one load-test run.
//!
//! This module provides:
//! - The owned, resettable event store
//! - The integer target identifier used by every query
//! - Selection of which targets participate in a query

pub mod event_store;
pub mod selection;

// Re-export main types
pub use event_store::{EventSample, EventStore, MeasurementPoint, TargetId, TargetLog};
pub use selection::Selection;
