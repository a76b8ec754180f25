//! On-demand query-log feed.
//!
//! Unlike health and metrics, the log feed is not interval-driven: the
//! query-log table is wide and busy, so it is fetched once when a node is
//! selected and again only on an explicit user refresh.

use std::sync::Arc;

use tracing::warn;

use crate::client::QueryExecutor;
use crate::data::node::Node;
use crate::data::row::RowSet;
use crate::poll::{Slot, Token};

/// Query fetching the 100 most recent query-log rows, newest first.
pub const LOGS_QUERY: &str =
    "SELECT * FROM system.query_log ORDER BY event_time DESC LIMIT 100 FORMAT JSON;";

/// On-demand fetcher for one node's recent query log.
///
/// Each fetched row set is meant to replace the table engine's rows
/// wholesale; rows are never merged across refreshes.
#[derive(Debug)]
pub struct LogFeed {
    node: Node,
    executor: Arc<dyn QueryExecutor>,
    slot: Slot,
    token: Token,
}

impl LogFeed {
    /// Bind the feed to `node` under a fresh generation from `slot`.
    pub fn bind(node: Node, executor: Arc<dyn QueryExecutor>, slot: &Slot) -> Self {
        let token = slot.issue();
        Self {
            node,
            executor,
            slot: slot.clone(),
            token,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The generation this feed was bound under.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Fetch the latest rows.
    ///
    /// Returns `None` when the fetch failed (logged, last good data stays
    /// on display) or when the slot was rebound while the request was in
    /// flight (the stale result must not reach the new binding's table).
    pub async fn refresh(&self) -> Option<RowSet> {
        let result = self
            .executor
            .execute(&self.node.host_address, LOGS_QUERY)
            .await;

        if !self.slot.is_current(self.token) {
            return None;
        }

        match result {
            Ok(rows) => Some(rows),
            Err(err) => {
                warn!(host = %self.node.host_address, error = %err, "log fetch failed, keeping last rows");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::{CellValue, LogRow};
    use crate::feed::testing::ScriptedExecutor;

    fn node() -> Node {
        Node {
            host_name: "ch-1".into(),
            host_address: "10.0.0.1".into(),
        }
    }

    fn log_rows(id: &str) -> RowSet {
        let mut row = LogRow::new();
        row.insert("query_id".into(), CellValue::Text(id.into()));
        vec![row]
    }

    #[tokio::test]
    async fn refresh_returns_fetched_rows() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(log_rows("q1"))]));
        let slot = Slot::new();
        let feed = LogFeed::bind(node(), executor, &slot);

        let rows = feed.refresh().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["query_id"], CellValue::Text("q1".into()));
    }

    #[tokio::test]
    async fn failed_refresh_yields_none() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Err("refused".into())]));
        let slot = Slot::new();
        let feed = LogFeed::bind(node(), executor, &slot);

        assert!(feed.refresh().await.is_none());
    }

    #[tokio::test]
    async fn stale_binding_drops_its_result() {
        let slot = Slot::new();
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(log_rows("old"))]));
        let old = LogFeed::bind(node(), executor.clone(), &slot);

        // A new binding supersedes the old one before its result is applied
        let _new = LogFeed::bind(node(), executor, &slot);

        assert!(old.refresh().await.is_none());
    }
}
