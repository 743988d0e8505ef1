//! Run telemetry written to disk for post-mortem inspection.

pub mod transcript_dump;
