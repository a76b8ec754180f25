//! Cluster nodes, health states, and the health grid layout.

use serde::{Deserialize, Serialize};

use super::row::{CellValue, RowSet};

/// One node in the monitored cluster.
///
/// Identity is `host_address`; `host_name` is display-only. Nodes are
/// immutable once fetched; a topology refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub host_name: String,
    pub host_address: String,
}

impl Node {
    /// Extract nodes from the rows of a `system.clusters` query.
    ///
    /// Rows missing either column are skipped; the endpoint may expose
    /// replicas we cannot address.
    pub fn from_topology(rows: &RowSet) -> Vec<Node> {
        rows.iter()
            .filter_map(|row| {
                let host_name = text_cell(row.get("host_name"))?;
                let host_address = text_cell(row.get("host_address"))?;
                Some(Node {
                    host_name,
                    host_address,
                })
            })
            .collect()
    }
}

fn text_cell(cell: Option<&CellValue>) -> Option<String> {
    match cell {
        Some(CellValue::Text(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Health state derived from liveness probes.
///
/// Starts `Unknown` and never returns to it once the first probe lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "?",
            HealthStatus::Healthy => "OK",
            HealthStatus::Unhealthy => "DOWN",
        }
    }
}

/// Grid dimensions for laying out `n` node cells.
///
/// Width is `ceil(sqrt(n))`, height `ceil(n / width)`; the grid is filled
/// row-major and trailing cells stay empty. Must be recomputed whenever the
/// node count changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub width: usize,
    pub height: usize,
}

impl GridLayout {
    pub fn for_count(n: usize) -> Self {
        if n == 0 {
            return Self {
                width: 0,
                height: 0,
            };
        }
        let width = (n as f64).sqrt().ceil() as usize;
        let height = n.div_ceil(width);
        Self { width, height }
    }

    /// Index into the node list for a grid cell, row-major; `None` for a
    /// trailing empty cell.
    pub fn cell_index(&self, row: usize, col: usize, count: usize) -> Option<usize> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let idx = row * self.width + col;
        (idx < count).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::LogRow;

    fn topology_row(name: &str, addr: &str) -> LogRow {
        let mut row = LogRow::new();
        row.insert("cluster".into(), CellValue::Text("test_cluster".into()));
        row.insert("host_name".into(), CellValue::Text(name.into()));
        row.insert("host_address".into(), CellValue::Text(addr.into()));
        row
    }

    #[test]
    fn parses_topology_rows() {
        let rows = vec![
            topology_row("ch-1", "10.0.0.1"),
            topology_row("ch-2", "10.0.0.2"),
        ];
        let nodes = Node::from_topology(&rows);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].host_name, "ch-1");
        assert_eq!(nodes[1].host_address, "10.0.0.2");
    }

    #[test]
    fn skips_rows_without_address() {
        let mut partial = LogRow::new();
        partial.insert("host_name".into(), CellValue::Text("orphan".into()));
        let rows = vec![partial, topology_row("ch-1", "10.0.0.1")];
        assert_eq!(Node::from_topology(&rows).len(), 1);
    }

    #[test]
    fn grid_dimensions() {
        assert_eq!(GridLayout::for_count(1), GridLayout { width: 1, height: 1 });
        assert_eq!(GridLayout::for_count(4), GridLayout { width: 2, height: 2 });
        assert_eq!(GridLayout::for_count(5), GridLayout { width: 3, height: 2 });
        assert_eq!(GridLayout::for_count(10), GridLayout { width: 4, height: 3 });
    }

    #[test]
    fn grid_trailing_cells_are_empty() {
        let grid = GridLayout::for_count(5);
        assert_eq!(grid.cell_index(0, 0, 5), Some(0));
        assert_eq!(grid.cell_index(1, 1, 5), Some(4));
        // cell 5 of a 3x2 grid has no node behind it
        assert_eq!(grid.cell_index(1, 2, 5), None);
        assert_eq!(grid.cell_index(2, 0, 5), None);
    }

    #[test]
    fn status_never_defaults_to_anything_but_unknown() {
        assert_eq!(HealthStatus::default(), HealthStatus::Unknown);
        assert_eq!(HealthStatus::Unhealthy.symbol(), "DOWN");
    }
}
