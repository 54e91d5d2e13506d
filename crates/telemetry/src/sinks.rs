// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling the orchestrator from the backend.

/// A no-op sink for use in tests where metrics are not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

/// Lifecycle metrics reported by a local network.
pub trait NetworkMetricsSink: Send + Sync + std::fmt::Debug {
    fn inc_nodes_added(&self);
    fn inc_nodes_removed(&self);
    /// Counts a failed node operation, labelled by error kind.
    fn inc_node_failures(&self, kind: &str);
    fn set_live_nodes(&self, count: usize);
    /// Records how long a `healthy` call waited, whatever its outcome.
    fn observe_health_wait(&self, duration_secs: f64);
}

impl NetworkMetricsSink for NopSink {
    fn inc_nodes_added(&self) {}
    fn inc_nodes_removed(&self) {}
    fn inc_node_failures(&self, _kind: &str) {}
    fn set_live_nodes(&self, _count: usize) {}
    fn observe_health_wait(&self, _duration_secs: f64) {}
}
