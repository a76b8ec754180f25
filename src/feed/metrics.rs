//! Scheduled resource-metric feed for the selected node.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use crate::client::QueryExecutor;
use crate::data::metrics::MetricSeries;
use crate::data::node::Node;
use crate::poll::{PollHandle, Poller, Slot, Token};

/// Metric fetch cadence. Deliberately slower than the health probe; one
/// query returns 100 rows of four columns.
pub const METRICS_INTERVAL: Duration = Duration::from_millis(10_000);

/// Query fetching the shared time axis and the three tracked metrics,
/// newest first.
pub const METRICS_QUERY: &str = "SELECT event_time, CurrentMetric_MemoryTracking, \
     ProfileEvent_UserTimeMicroseconds, ProfileEvent_SystemTimeMicroseconds \
     FROM system.metric_log ORDER BY event_time DESC LIMIT 100 FORMAT JSON;";

/// Scheduled fetcher for one node's [`MetricSeries`].
///
/// On a failed fetch the previously published series stays in place: a
/// persistent error freezes the charts rather than blanking them. The feed
/// is bound to a UI slot through a generation token; a response that lands
/// after the slot was rebound is dropped.
#[derive(Debug)]
pub struct MetricsFeed {
    node: Node,
    series_rx: watch::Receiver<MetricSeries>,
    handle: PollHandle,
    token: Token,
}

impl MetricsFeed {
    /// Issue a new generation from `slot` and start polling `node`.
    pub fn start(node: Node, executor: Arc<dyn QueryExecutor>, slot: &Slot) -> Self {
        let token = slot.issue();
        let slot = slot.clone();
        let (series_tx, series_rx) = watch::channel(MetricSeries::default());
        let host = node.host_address.clone();

        let handle = Poller::spawn(METRICS_INTERVAL, move || {
            let executor = executor.clone();
            let slot = slot.clone();
            let host = host.clone();
            let series_tx = series_tx.clone();
            async move {
                match executor.execute(&host, METRICS_QUERY).await {
                    Ok(rows) => {
                        // A rebind may have happened while the request was
                        // in flight; a stale result must not land.
                        if slot.is_current(token) {
                            let _ = series_tx.send(MetricSeries::from_rows(&rows));
                        }
                    }
                    Err(err) => {
                        warn!(host = %host, error = %err, "metric fetch failed, keeping last series");
                    }
                }
            }
        });

        Self {
            node,
            series_rx,
            handle,
            token,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Latest good series; empty until the first successful fetch.
    pub fn series(&self) -> MetricSeries {
        self.series_rx.borrow().clone()
    }

    /// Watch the series for updates.
    pub fn subscribe(&self) -> watch::Receiver<MetricSeries> {
        self.series_rx.clone()
    }

    /// The generation this feed was bound under.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Stop polling. Equivalent to dropping the feed.
    pub fn stop(&self) {
        self.handle.cancel();
    }
}
