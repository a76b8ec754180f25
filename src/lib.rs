// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # clickwatch
//!
//! Live data engine for monitoring a ClickHouse cluster.
//!
//! This crate keeps a dashboard's data fresh: it probes every cluster node
//! for liveness, polls the selected node's resource metrics, fetches its
//! recent query log on demand, and runs the fetched rows through a
//! filter/search/sort/paginate pipeline for tabular display. Rendering and
//! navigation are left to the embedding front end; this crate only owns the
//! data and its refresh lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Dashboard (app)                     │
//! │  ┌────────┐   ┌───────────────┐   ┌─────────────────────┐  │
//! │  │ client │──▶│ feed          │──▶│ data / table        │  │
//! │  │ (HTTP) │   │ health        │   │ Node, MetricSeries  │  │
//! │  └────────┘   │ metrics  logs │   │ TableEngine         │  │
//! │       ▲       └──────┬────────┘   └─────────────────────┘  │
//! │       │              │ scheduled by                        │
//! │       │       ┌──────▼────────┐                            │
//! │       └───────│ poll          │  Poller / Slot tokens      │
//! │               └───────────────┘                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`client`]**: HTTP query client for the nodes' text-query interface,
//!   behind the [`QueryExecutor`] trait seam
//! - **[`poll`]**: the "run now, then every N ms" scheduler and the
//!   generation tokens that fence off stale in-flight results
//! - **[`feed`]**: per-node health probing, metric polling, and on-demand
//!   log fetching
//! - **[`data`]**: nodes, health states, grid layout, rows, metric series
//! - **[`table`]**: the filter → fuzzy search → stable sort → paginate
//!   pipeline and its view state
//! - **[`app`]**: one session's worth of wiring: topology, monitors,
//!   selection rebinding
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use clickwatch::{Dashboard, QueryClient};
//!
//! # tokio_test::block_on(async {
//! let mut dashboard = Dashboard::new(Arc::new(QueryClient::new()));
//! dashboard.connect("http://localhost:8123").await?;
//!
//! if dashboard.select_node(0).await {
//!     let table = dashboard.table().unwrap();
//!     for row in table.displayed_page() {
//!         println!("{:?}", row);
//!     }
//! }
//! # Ok::<(), clickwatch::QueryError>(())
//! # });
//! ```

pub mod app;
pub mod client;
pub mod data;
pub mod error;
pub mod feed;
pub mod poll;
pub mod table;

// Re-export main types for convenience
pub use app::{log_columns, Dashboard};
pub use client::{QueryClient, QueryExecutor};
pub use data::{CellValue, GridLayout, HealthStatus, LogRow, MetricSeries, Node, RowSet};
pub use error::QueryError;
pub use feed::{HealthMonitor, LogFeed, MetricsFeed};
pub use poll::{PollHandle, Poller, Slot, Token};
pub use table::{
    ColumnSpec, FilterKind, FilterValue, SortDirection, TableEngine, TableViewState,
};
