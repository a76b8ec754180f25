//! Row and cell types for query results.
//!
//! Query responses arrive as JSON objects with arbitrary column names, so a
//! row is an open string-keyed map of scalar cells rather than a fixed
//! struct. Column semantics are supplied separately by `ColumnSpec`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar cell from a query result.
///
/// ClickHouse's JSON format renders large integers as strings, so numeric
/// columns may arrive as either `Number` or `Text`; [`CellValue::as_number`]
/// handles both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the cell, parsing string-encoded numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// True for cells a search should treat as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One row of a query result: column name to scalar cell.
pub type LogRow = BTreeMap<String, CellValue>;

/// An ordered set of rows as returned by one query execution.
pub type RowSet = Vec<LogRow>;

/// The column every query-log row must carry; its value is the stable
/// identity used for cross-navigation to a query detail view.
pub const QUERY_ID_COLUMN: &str = "query_id";

/// Fetch a row's query id, if present.
pub fn query_id(row: &LogRow) -> Option<&str> {
    match row.get(QUERY_ID_COLUMN) {
        Some(CellValue::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}
