//! Per-node health monitoring.
//!
//! One monitor owns one node's [`HealthStatus`]: probe success moves it to
//! `Healthy`, any failure to `Unhealthy`, and once the first probe lands it
//! never shows `Unknown` again. No history is kept.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::client::QueryExecutor;
use crate::data::node::{HealthStatus, Node};
use crate::poll::{PollHandle, Poller};

/// Probe cadence.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(1000);

/// Scheduled liveness probe for a single node.
///
/// Dropping the monitor cancels its poll loop; a probe already in flight
/// finishes against a closed channel and its result goes nowhere.
#[derive(Debug)]
pub struct HealthMonitor {
    node: Node,
    status_rx: watch::Receiver<HealthStatus>,
    handle: PollHandle,
}

impl HealthMonitor {
    /// Start probing `node` on the fixed cadence.
    pub fn start(node: Node, executor: Arc<dyn QueryExecutor>) -> Self {
        let (status_tx, status_rx) = watch::channel(HealthStatus::Unknown);
        let host = node.host_address.clone();

        let handle = Poller::spawn(PROBE_INTERVAL, move || {
            let executor = executor.clone();
            let host = host.clone();
            let status_tx = status_tx.clone();
            async move {
                let status = match executor.probe(&host).await {
                    Ok(()) => HealthStatus::Healthy,
                    Err(err) => {
                        debug!(host = %host, error = %err, "probe failed");
                        HealthStatus::Unhealthy
                    }
                };
                let _ = status_tx.send(status);
            }
        });

        Self {
            node,
            status_rx,
            handle,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Current status for rendering.
    pub fn status(&self) -> HealthStatus {
        *self.status_rx.borrow()
    }

    /// Watch the status for changes.
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status_rx.clone()
    }

    /// Stop probing. Equivalent to dropping the monitor.
    pub fn stop(&self) {
        self.handle.cancel();
    }
}
