//! Data models for the dashboard engine.
//!
//! This module holds the types that flow between the query client, the
//! feeds, and the table engine.
//!
//! ## Submodules
//!
//! - [`row`]: Open string-keyed rows and scalar cells as returned by queries
//! - [`node`]: Cluster nodes, health states, and the health grid layout
//! - [`metrics`]: Aligned time-series columns for per-node resource metrics

pub mod metrics;
pub mod node;
pub mod row;

pub use metrics::MetricSeries;
pub use node::{GridLayout, HealthStatus, Node};
pub use row::{CellValue, LogRow, RowSet};
