//! Column specifications and per-column filter behavior.
//!
//! Each column declares which filter kind applies to it; the engine
//! dispatches to one pure predicate per kind. Filter values are validated
//! against the column's declared kind at the engine boundary rather than at
//! every access site.

use std::cmp::Ordering;

use crate::data::row::{CellValue, LogRow};

/// Filter behavior a column supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Column cannot be filtered.
    None,
    /// Exact match against one chosen option.
    Select,
    /// Case-insensitive prefix match on the stringified value.
    #[default]
    Text,
    /// Inclusive numeric range; an absent bound is unconstrained.
    NumericRange,
}

/// An active filter value for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Select(String),
    Text(String),
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl FilterValue {
    /// Whether this value is usable on a column of the given kind.
    pub fn fits(&self, kind: FilterKind) -> bool {
        matches!(
            (self, kind),
            (FilterValue::Select(_), FilterKind::Select)
                | (FilterValue::Text(_), FilterKind::Text)
                | (FilterValue::Range { .. }, FilterKind::NumericRange)
        )
    }
}

/// Static description of one table column, authored once per table
/// instance and shared across all rows.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Column name; doubles as the accessor key into each row.
    pub name: String,
    pub filter: FilterKind,
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, filter: FilterKind, sortable: bool) -> Self {
        Self {
            name: name.to_string(),
            filter,
            sortable,
        }
    }
}

/// Apply one column filter to one row.
///
/// `Text` deliberately lets a row with an undefined value pass; the
/// original dashboard tolerated rows predating a schema change and that
/// behavior is part of the contract.
pub fn row_matches(row: &LogRow, column: &str, filter: &FilterValue) -> bool {
    let cell = row.get(column);
    match filter {
        FilterValue::Select(choice) => match cell {
            Some(value) => value.to_string() == *choice,
            None => false,
        },
        FilterValue::Text(prefix) => match cell {
            Some(value) => value
                .to_string()
                .to_lowercase()
                .starts_with(&prefix.to_lowercase()),
            None => true,
        },
        FilterValue::Range { min, max } => match cell.and_then(CellValue::as_number) {
            Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
            None => false,
        },
    }
}

/// Ordering between two cells of the same column.
///
/// Numeric when both sides have a numeric view, lexicographic otherwise;
/// a missing cell sorts before any present one.
pub fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}
