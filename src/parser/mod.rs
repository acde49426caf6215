//! Wire decoding and report schema definitions.
//!
//! This module handles:
//! - Parsing transport messages and capture logs
//! - Defining the output report schema

pub mod ingest;
pub mod schema;

// Re-export main types
pub use ingest::{parse_message, read_capture_log, IngestPoint};
pub use schema::Report;
