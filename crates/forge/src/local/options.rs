// Path: crates/forge/src/local/options.rs

use super::{DEFAULT_HEALTH_CHECK_INTERVAL, DEFAULT_STOP_TIMEOUT};
use netrunner_telemetry::{NetworkMetricsSink, NopSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Runtime settings of a [`LocalNetwork`](super::LocalNetwork) that are not part of the
/// network's own configuration.
#[derive(Debug, Clone)]
pub struct NetworkOptions {
    /// Directory under which every node's files are written. A temporary directory,
    /// removed when the network is dropped, is used when unset.
    pub root_dir: Option<PathBuf>,
    /// Upper bound on how long `stop` keeps removing nodes.
    pub stop_timeout: Duration,
    /// How often each node's health endpoint is polled.
    pub health_check_interval: Duration,
    pub metrics: Arc<dyn NetworkMetricsSink>,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            root_dir: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            metrics: Arc::new(NopSink),
        }
    }
}

impl NetworkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn NetworkMetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }
}
