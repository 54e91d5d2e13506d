// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

// --- Metric Definitions ---

// GAUGE (no _total suffix)
static LIVE_NODES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "netrunner_live_nodes",
        "Current number of nodes tracked by the local network."
    )
    .unwrap()
});

// COUNTER (correctly uses _total suffix)
static NODES_ADDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "netrunner_nodes_added_total",
        "Total number of nodes successfully started."
    )
    .unwrap()
});
static NODES_REMOVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "netrunner_nodes_removed_total",
        "Total number of nodes removed from the network."
    )
    .unwrap()
});
static NODE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "netrunner_node_failures_total",
        "Total failed node operations by error kind.",
        &["kind"]
    )
    .unwrap()
});

// HISTOGRAM (uses unit suffix like _seconds)
static HEALTH_WAIT_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "netrunner_health_wait_seconds",
        "Time spent waiting for the whole network to report healthy.",
        exponential_buckets(0.05, 2.0, 14).unwrap()
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl NetworkMetricsSink for PrometheusSink {
    fn inc_nodes_added(&self) {
        NODES_ADDED_TOTAL.inc();
    }
    fn inc_nodes_removed(&self) {
        NODES_REMOVED_TOTAL.inc();
    }
    fn inc_node_failures(&self, kind: &str) {
        NODE_FAILURES_TOTAL.with_label_values(&[kind]).inc();
    }
    fn set_live_nodes(&self, count: usize) {
        LIVE_NODES.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
    fn observe_health_wait(&self, duration_secs: f64) {
        HEALTH_WAIT_SECONDS.observe(duration_secs);
    }
}

/// Renders every registered metric in the Prometheus text exposition format.
pub fn gather_text() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_metrics_show_up_in_text_output() {
        let sink = PrometheusSink;
        sink.inc_nodes_added();
        sink.set_live_nodes(3);
        sink.inc_node_failures("node_exit");
        sink.observe_health_wait(0.5);

        let text = gather_text().unwrap();
        assert!(text.contains("netrunner_nodes_added_total"));
        assert!(text.contains("netrunner_live_nodes 3"));
        assert!(text.contains("kind=\"node_exit\""));
        assert!(text.contains("netrunner_health_wait_seconds_count"));
    }
}
