//! Dashboard session state and feed wiring.
//!
//! A [`Dashboard`] owns everything one monitoring session holds in memory:
//! the entered base URL, the node list from the topology query, one health
//! monitor per node, and, for the currently selected node, the metrics
//! feed, the log feed, and the table engine over the fetched log rows.
//! Nothing here persists across sessions.

use std::sync::Arc;

use tracing::info;

use crate::client::{base_endpoint, QueryExecutor, TOPOLOGY_QUERY};
use crate::data::metrics::MetricSeries;
use crate::data::node::{GridLayout, HealthStatus, Node};
use crate::error::QueryError;
use crate::feed::{HealthMonitor, LogFeed, MetricsFeed};
use crate::poll::Slot;
use crate::table::{ColumnSpec, FilterKind, TableEngine};

/// Column set of the query-log table: which filter applies to each column
/// and which columns sort. `query_id` carries the identity used to open a
/// query detail view, so it is neither filtered nor sorted.
pub fn log_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("type", FilterKind::Select, false),
        ColumnSpec::new("user", FilterKind::Select, false),
        ColumnSpec::new("query_id", FilterKind::None, false),
        ColumnSpec::new("event_time", FilterKind::None, true),
        ColumnSpec::new("query_start_time", FilterKind::None, true),
        ColumnSpec::new("query_duration_ms", FilterKind::NumericRange, true),
        ColumnSpec::new("read_bytes", FilterKind::NumericRange, true),
    ]
}

/// The feeds and table bound to the node currently on display.
struct Selection {
    node: Node,
    metrics: MetricsFeed,
    logs: LogFeed,
    table: TableEngine,
}

/// One monitoring session.
pub struct Dashboard {
    executor: Arc<dyn QueryExecutor>,
    base_url: Option<String>,
    nodes: Vec<Node>,
    monitors: Vec<HealthMonitor>,
    topology_error: Option<String>,
    selection: Option<Selection>,
    metrics_slot: Slot,
    logs_slot: Slot,
}

impl Dashboard {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            base_url: None,
            nodes: Vec::new(),
            monitors: Vec::new(),
            topology_error: None,
            selection: None,
            metrics_slot: Slot::new(),
            logs_slot: Slot::new(),
        }
    }

    /// Fetch the cluster topology from `base_url` and start one health
    /// monitor per node.
    ///
    /// The node list is replaced wholesale, never merged. On failure the
    /// list stays empty and the error is kept for inline display; nothing
    /// is fatal to the session.
    pub async fn connect(&mut self, base_url: &str) -> Result<usize, QueryError> {
        self.base_url = Some(base_url.to_string());
        self.deselect();
        self.monitors.clear();
        self.nodes.clear();

        let rows = match self
            .executor
            .execute_url(&base_endpoint(base_url), TOPOLOGY_QUERY)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                self.topology_error = Some(err.to_string());
                return Err(err);
            }
        };

        self.topology_error = None;
        self.nodes = Node::from_topology(&rows);
        self.monitors = self
            .nodes
            .iter()
            .map(|node| HealthMonitor::start(node.clone(), self.executor.clone()))
            .collect();

        info!(nodes = self.nodes.len(), "topology loaded");
        Ok(self.nodes.len())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Topology failure to report inline, if the last connect failed.
    pub fn topology_error(&self) -> Option<&str> {
        self.topology_error.as_deref()
    }

    /// Grid dimensions for the current node count.
    pub fn grid(&self) -> GridLayout {
        GridLayout::for_count(self.nodes.len())
    }

    /// Health of the node at `index`, as last probed.
    pub fn health(&self, index: usize) -> HealthStatus {
        self.monitors
            .get(index)
            .map(|m| m.status())
            .unwrap_or(HealthStatus::Unknown)
    }

    /// Select a node for detail display and fetch its query log once.
    ///
    /// Rebinds the per-node feeds atomically: the previous selection's
    /// handles are cancelled before the new generations are issued, so no
    /// two pollers are ever live for the same slot. A stale response from
    /// the old binding can still arrive, but its token no longer matches
    /// and it is dropped.
    pub async fn select_node(&mut self, index: usize) -> bool {
        let Some(node) = self.nodes.get(index).cloned() else {
            return false;
        };

        // Cancel the old binding first
        self.deselect();

        let metrics = MetricsFeed::start(node.clone(), self.executor.clone(), &self.metrics_slot);
        let logs = LogFeed::bind(node.clone(), self.executor.clone(), &self.logs_slot);
        let table = TableEngine::new(log_columns());

        self.selection = Some(Selection {
            node,
            metrics,
            logs,
            table,
        });
        self.refresh_logs().await;
        true
    }

    /// Tear down the current selection, cancelling its feeds.
    ///
    /// In-flight requests from the old binding cannot be retracted; moving
    /// both slots to a fresh generation makes their results stale instead.
    pub fn deselect(&mut self) {
        if let Some(selection) = self.selection.take() {
            selection.metrics.stop();
            self.metrics_slot.issue();
            self.logs_slot.issue();
            info!(host = %selection.node.host_address, "selection torn down");
        }
    }

    /// The currently selected node, if any.
    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.as_ref().map(|s| &s.node)
    }

    /// Latest metric series for the selected node.
    pub fn metric_series(&self) -> Option<MetricSeries> {
        self.selection.as_ref().map(|s| s.metrics.series())
    }

    /// Re-fetch the selected node's query log and replace the table rows.
    ///
    /// Explicitly user-driven; the log feed has no poll interval. Returns
    /// false when nothing was applied (no selection, fetch failure, or a
    /// stale binding).
    pub async fn refresh_logs(&mut self) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        match selection.logs.refresh().await {
            Some(rows) => {
                selection.table.set_rows(rows);
                true
            }
            None => false,
        }
    }

    /// Table engine over the selected node's log rows.
    pub fn table(&self) -> Option<&TableEngine> {
        self.selection.as_ref().map(|s| &s.table)
    }

    /// Mutable table engine for filter/sort/page operations.
    pub fn table_mut(&mut self) -> Option<&mut TableEngine> {
        self.selection.as_mut().map(|s| &mut s.table)
    }
}
