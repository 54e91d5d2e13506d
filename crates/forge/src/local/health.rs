// Path: crates/forge/src/local/health.rs

//! Concurrent health polling.
//!
//! One task per node polls the node's health endpoint until it reports healthy. The
//! first task to fail cancels and aborts the rest, so a single unhealthy node fails
//! the whole wait without waiting for the other nodes.

use super::node::Node;
use netrunner_types::NetworkError;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Waits until every node in `nodes` reports healthy.
///
/// `closed` fires when the network stops and fails the wait with
/// [`NetworkError::Stopped`]; `ctx` is the caller's deadline and fails it with
/// [`NetworkError::HealthTimeout`].
pub async fn wait_all_healthy(
    nodes: Vec<Node>,
    closed: CancellationToken,
    ctx: CancellationToken,
    interval: Duration,
) -> Result<(), NetworkError> {
    let scope = ctx.child_token();
    let mut tasks = JoinSet::new();
    for node in nodes {
        tasks.spawn(poll_until_healthy(node, closed.clone(), scope.clone(), interval));
    }

    while let Some(joined) = tasks.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // Tasks are only aborted below, after which nothing is joined.
            Err(_) => continue,
        };
        if let Err(e) = result {
            scope.cancel();
            tasks.abort_all();
            return Err(e);
        }
    }
    Ok(())
}

async fn poll_until_healthy(
    node: Node,
    closed: CancellationToken,
    ctx: CancellationToken,
    interval: Duration,
) -> Result<(), NetworkError> {
    let timed_out = || NetworkError::HealthTimeout(node.name().to_string());
    loop {
        tokio::select! {
            biased;
            _ = closed.cancelled() => return Err(NetworkError::Stopped),
            _ = ctx.cancelled() => return Err(timed_out()),
            _ = tokio::time::sleep(interval) => {}
        }

        let health = tokio::select! {
            biased;
            _ = closed.cancelled() => return Err(NetworkError::Stopped),
            _ = ctx.cancelled() => return Err(timed_out()),
            health = node.client().health_api().health() => health,
        };
        match health {
            Ok(true) => {
                debug!(node = %node.name(), "node became healthy");
                return Ok(());
            }
            Ok(false) => trace!(node = %node.name(), "node not healthy yet"),
            Err(e) => trace!(node = %node.name(), error = %e, "health check failed"),
        }
    }
}
