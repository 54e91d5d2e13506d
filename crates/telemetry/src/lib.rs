// Path: crates/telemetry/src/lib.rs
//! Logging and metrics plumbing shared by the network runner crates.

pub mod init;
pub mod prometheus;
pub mod sinks;

pub use sinks::{NetworkMetricsSink, NopSink};
