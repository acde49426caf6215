//! Configuration and constants for the telemetry engine and CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Percentage of samples dropped (half from each end) by the trimmed mean
pub const DEFAULT_TRIM_PERCENT: f64 = 10.0;

// Event names emitted by the HTTP client listener for every call
pub const CALL_END_EVENT: &str = "callEnd";
pub const CALL_FAILED_EVENT: &str = "callFailed";
pub const TTFB_EVENT: &str = "responseHeadersStart";

// Suffixes that turn a stage name into its lifecycle events
pub const STAGE_START_SUFFIX: &str = "Start";
pub const STAGE_END_SUFFIX: &str = "End";
pub const STAGE_FAILED_SUFFIX: &str = "Failed";

/// Row label used for time to first byte in the stage waterfall
pub const TTFB_ROW: &str = "TTFB";

/// Series name used by the distribution when every target is selected
pub const TOTAL_SERIES: &str = "Total";
