//! Independently-scheduled data feeds bound to cluster nodes.
//!
//! Each feed pairs one node with one fetch routine and its own cadence:
//!
//! - [`health`]: liveness probe every second, publishing a tri-state status
//! - [`metrics`]: resource metrics every ten seconds, keeping the last good
//!   series across failures
//! - [`logs`]: recent query-log rows, fetched on demand only
//!
//! Feeds publish through watch channels; dropping a feed cancels its poll
//! loop, and results from a superseded binding are fenced off by the
//! generation tokens in [`crate::poll`].

pub mod health;
pub mod logs;
pub mod metrics;

pub use health::HealthMonitor;
pub use logs::LogFeed;
pub use metrics::MetricsFeed;

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted stand-in for the live query endpoint.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::client::QueryExecutor;
    use crate::data::row::RowSet;
    use crate::error::QueryError;

    /// Replays a queue of canned outcomes; repeats the last one forever.
    #[derive(Debug, Default)]
    pub struct ScriptedExecutor {
        outcomes: Mutex<VecDeque<Result<RowSet, String>>>,
        last: Mutex<Option<Result<RowSet, String>>>,
    }

    impl ScriptedExecutor {
        pub fn new(outcomes: Vec<Result<RowSet, String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                last: Mutex::new(None),
            }
        }

        fn next(&self) -> Result<RowSet, QueryError> {
            let mut queue = self.outcomes.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(outcome) = queue.pop_front() {
                *last = Some(outcome);
            }
            match last.as_ref() {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(msg)) => Err(QueryError::Network(msg.clone())),
                None => Ok(RowSet::new()),
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for ScriptedExecutor {
        async fn execute_url(&self, _url: &str, _query: &str) -> Result<RowSet, QueryError> {
            self.next()
        }

        async fn probe(&self, _host: &str) -> Result<(), QueryError> {
            self.next().map(|_| ())
        }
    }
}
