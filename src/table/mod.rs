//! Generic filter/search/sort/paginate pipeline over row sets.
//!
//! [`TableEngine`] owns one row set, one set of [`ColumnSpec`]s, and one
//! [`TableViewState`]; every mutating operation re-runs the full pipeline:
//!
//! ```text
//! rows ──▶ column filters ──▶ global fuzzy search ──▶ sort ──▶ paginate
//! ```
//!
//! Each stage consumes the previous stage's output. The sort is stable, so
//! rows with equal keys keep the relative order the search ranking gave
//! them. `page_index` is clamped into range after every mutation and reset
//! to the first page whenever a filter changes.

pub mod column;
pub mod fuzzy;

pub use column::{compare_cells, row_matches, ColumnSpec, FilterKind, FilterValue};
pub use fuzzy::Rank;

use std::collections::BTreeMap;

use crate::data::row::{LogRow, RowSet};

/// Default rows per page, matching the original dashboard's table.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Sort direction for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort: one column, one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// View state owned by one engine instance, mutated only through the
/// engine's operations.
#[derive(Debug, Clone)]
pub struct TableViewState {
    pub column_filters: BTreeMap<String, FilterValue>,
    pub global_filter: Option<String>,
    pub sort: Option<SortSpec>,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self {
            column_filters: BTreeMap::new(),
            global_filter: None,
            sort: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Deterministic table pipeline over an owned row set.
///
/// Rows are immutable snapshots; [`TableEngine::set_rows`] replaces the
/// whole set, it never patches individual rows.
#[derive(Debug)]
pub struct TableEngine {
    columns: Vec<ColumnSpec>,
    rows: RowSet,
    state: TableViewState,
    /// Pipeline output through the sort stage: indices into `rows`.
    filtered: Vec<usize>,
}

impl TableEngine {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        let mut engine = Self {
            columns,
            rows: RowSet::new(),
            state: TableViewState::default(),
            filtered: Vec::new(),
        };
        engine.recompute();
        engine
    }

    /// Replace the row set wholesale (a fresh poll landed).
    pub fn set_rows(&mut self, rows: RowSet) {
        self.rows = rows;
        self.recompute();
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn view_state(&self) -> &TableViewState {
        &self.state
    }

    /// Set a column filter. Ignored when the column is unknown or the value
    /// does not fit the column's declared filter kind.
    pub fn set_column_filter(&mut self, column: &str, value: FilterValue) {
        let Some(spec) = self.columns.iter().find(|c| c.name == column) else {
            return;
        };
        if !value.fits(spec.filter) {
            return;
        }
        self.state.column_filters.insert(column.to_string(), value);
        self.state.page_index = 0;
        self.recompute();
    }

    /// Remove a column filter if one is active.
    pub fn clear_column_filter(&mut self, column: &str) {
        if self.state.column_filters.remove(column).is_some() {
            self.state.page_index = 0;
            self.recompute();
        }
    }

    /// Set or clear the global fuzzy search. An empty string clears it;
    /// an unset filter is a strict no-op on the pipeline.
    pub fn set_global_filter(&mut self, value: &str) {
        let next = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        if next != self.state.global_filter {
            self.state.global_filter = next;
            self.state.page_index = 0;
            self.recompute();
        }
    }

    /// Sort by a column. Ignored for unknown or non-sortable columns.
    pub fn set_sort(&mut self, column: &str, direction: SortDirection) {
        let sortable = self
            .columns
            .iter()
            .any(|c| c.name == column && c.sortable);
        if !sortable {
            return;
        }
        self.state.sort = Some(SortSpec {
            column: column.to_string(),
            direction,
        });
        self.recompute();
    }

    /// Clear any active sort, restoring search-ranked order.
    pub fn clear_sort(&mut self) {
        if self.state.sort.take().is_some() {
            self.recompute();
        }
    }

    /// Jump to a page; out-of-range arguments clamp, they never error.
    pub fn goto_page(&mut self, page: usize) {
        self.state.page_index = page.min(self.page_count() - 1);
    }

    pub fn next_page(&mut self) {
        self.goto_page(self.state.page_index.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.state.page_index = self.state.page_index.saturating_sub(1);
    }

    /// Change the page size (minimum 1) and re-clamp the page index.
    pub fn set_page_size(&mut self, size: usize) {
        self.state.page_size = size.max(1);
        self.clamp_page();
    }

    /// Rows on the current page, in pipeline order.
    pub fn displayed_page(&self) -> Vec<&LogRow> {
        let start = self.state.page_index * self.state.page_size;
        self.filtered
            .iter()
            .skip(start)
            .take(self.state.page_size)
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Row count after the filter stages.
    pub fn filtered_row_count(&self) -> usize {
        self.filtered.len()
    }

    /// Number of pages; at least 1 even for an empty filtered set.
    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.state.page_size).max(1)
    }

    /// Re-run the full pipeline through the sort stage and re-clamp the
    /// page index for the new result.
    fn recompute(&mut self) {
        self.filtered = self.run_pipeline();
        self.clamp_page();
    }

    fn run_pipeline(&self) -> Vec<usize> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        // Stage 1: column filters
        let mut kept: Vec<usize> = (0..self.rows.len())
            .filter(|&i| {
                self.state
                    .column_filters
                    .iter()
                    .all(|(column, filter)| row_matches(&self.rows[i], column, filter))
            })
            .collect();

        // Stage 2: global fuzzy search, best matches first
        if let Some(needle) = self.state.global_filter.as_deref() {
            let mut ranked: Vec<(usize, Rank)> = kept
                .into_iter()
                .map(|i| (i, fuzzy::rank_row(&self.rows[i], needle)))
                .filter(|(_, rank)| *rank != Rank::NoMatch)
                .collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            kept = ranked.into_iter().map(|(i, _)| i).collect();
        }

        // Stage 3: stable sort keeps stage-2 order among equal keys
        if let Some(sort) = &self.state.sort {
            kept.sort_by(|&a, &b| {
                let ord = compare_cells(
                    self.rows[a].get(&sort.column),
                    self.rows[b].get(&sort.column),
                );
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        kept
    }

    fn clamp_page(&mut self) {
        self.state.page_index = self.state.page_index.min(self.page_count() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::CellValue;

    fn log_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("type", FilterKind::Select, false),
            ColumnSpec::new("user", FilterKind::Select, false),
            ColumnSpec::new("query_id", FilterKind::None, false),
            ColumnSpec::new("event_time", FilterKind::None, true),
            ColumnSpec::new("query_duration_ms", FilterKind::NumericRange, true),
            ColumnSpec::new("read_bytes", FilterKind::NumericRange, true),
        ]
    }

    fn log_row(id: &str, user: &str, duration: f64) -> LogRow {
        let mut row = LogRow::new();
        row.insert("query_id".into(), CellValue::Text(id.into()));
        row.insert("type".into(), CellValue::Text("QueryFinish".into()));
        row.insert("user".into(), CellValue::Text(user.into()));
        row.insert("query_duration_ms".into(), CellValue::Number(duration));
        row
    }

    fn engine_with(rows: RowSet) -> TableEngine {
        let mut engine = TableEngine::new(log_columns());
        engine.set_rows(rows);
        engine
    }

    fn ids(rows: &[&LogRow]) -> Vec<String> {
        rows.iter()
            .map(|r| r["query_id"].to_string())
            .collect()
    }

    #[test]
    fn empty_row_set_short_circuits() {
        let engine = engine_with(RowSet::new());
        assert!(engine.displayed_page().is_empty());
        assert_eq!(engine.page_count(), 1);
        assert_eq!(engine.filtered_row_count(), 0);
        assert_eq!(engine.view_state().page_index, 0);
    }

    #[test]
    fn filter_then_clear_restores_full_count() {
        let mut engine = engine_with(vec![
            log_row("q1", "alice", 10.0),
            log_row("q2", "bob", 20.0),
            log_row("q3", "alice", 30.0),
        ]);

        engine.set_column_filter("user", FilterValue::Select("alice".into()));
        assert_eq!(engine.filtered_row_count(), 2);

        engine.clear_column_filter("user");
        assert_eq!(engine.filtered_row_count(), 3);
    }

    #[test]
    fn empty_global_filter_is_a_no_op() {
        let rows = vec![log_row("q1", "alice", 10.0), log_row("q2", "", 20.0)];
        let mut engine = engine_with(rows.clone());
        let before = ids(&engine.displayed_page());

        engine.set_global_filter("");
        assert_eq!(ids(&engine.displayed_page()), before);
        // A row with an empty user cell is not excluded
        assert_eq!(engine.filtered_row_count(), 2);
    }

    #[test]
    fn global_filter_ranks_closer_matches_first() {
        let mut engine = engine_with(vec![
            log_row("q1", "malice", 10.0),
            log_row("q2", "alice", 20.0),
            log_row("q3", "bob", 30.0),
        ]);

        engine.set_global_filter("alice");
        assert_eq!(ids(&engine.displayed_page()), vec!["q2", "q1"]);
        assert_eq!(engine.filtered_row_count(), 2);
    }

    #[test]
    fn sort_is_stable_across_equal_keys() {
        let mut engine = engine_with(vec![
            log_row("q1", "alice", 20.0),
            log_row("q2", "bob", 10.0),
            log_row("q3", "carol", 20.0),
            log_row("q4", "dave", 10.0),
        ]);

        engine.set_sort("query_duration_ms", SortDirection::Ascending);
        assert_eq!(ids(&engine.displayed_page()), vec!["q2", "q4", "q1", "q3"]);

        engine.set_sort("query_duration_ms", SortDirection::Descending);
        assert_eq!(ids(&engine.displayed_page()), vec!["q1", "q3", "q2", "q4"]);
    }

    #[test]
    fn sort_on_non_sortable_column_is_ignored() {
        let mut engine = engine_with(vec![
            log_row("q2", "bob", 10.0),
            log_row("q1", "alice", 20.0),
        ]);

        engine.set_sort("user", SortDirection::Ascending);
        assert!(engine.view_state().sort.is_none());
        assert_eq!(ids(&engine.displayed_page()), vec!["q2", "q1"]);
    }

    #[test]
    fn page_count_formula() {
        let mut engine = engine_with((0..7).map(|i| log_row(&format!("q{}", i), "u", 1.0)).collect());

        engine.set_page_size(5);
        assert_eq!(engine.page_count(), 2);
        engine.set_page_size(7);
        assert_eq!(engine.page_count(), 1);
        engine.set_page_size(3);
        assert_eq!(engine.page_count(), 3);
    }

    #[test]
    fn goto_page_clamps() {
        let mut engine = engine_with((0..7).map(|i| log_row(&format!("q{}", i), "u", 1.0)).collect());
        engine.set_page_size(5);

        engine.goto_page(99);
        assert_eq!(engine.view_state().page_index, 1);
        assert_eq!(engine.displayed_page().len(), 2);

        engine.goto_page(0);
        assert_eq!(engine.displayed_page().len(), 5);

        engine.next_page();
        engine.next_page();
        assert_eq!(engine.view_state().page_index, 1);

        engine.previous_page();
        engine.previous_page();
        assert_eq!(engine.view_state().page_index, 0);
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut engine = engine_with(
            (0..20)
                .map(|i| log_row(&format!("q{}", i), if i < 3 { "alice" } else { "bob" }, 1.0))
                .collect(),
        );
        engine.set_page_size(5);
        engine.goto_page(3);
        assert_eq!(engine.view_state().page_index, 3);

        engine.set_column_filter("user", FilterValue::Select("alice".into()));
        assert_eq!(engine.view_state().page_index, 0);
        assert_eq!(engine.page_count(), 1);
    }

    #[test]
    fn shrinking_page_size_never_leaves_index_out_of_range() {
        let mut engine = engine_with((0..12).map(|i| log_row(&format!("q{}", i), "u", 1.0)).collect());
        engine.set_page_size(12);
        engine.goto_page(0);
        engine.set_page_size(1);
        engine.goto_page(11);
        engine.set_page_size(6);
        assert_eq!(engine.view_state().page_index, 1);
    }

    #[test]
    fn mismatched_filter_kind_is_rejected_at_the_boundary() {
        let mut engine = engine_with(vec![log_row("q1", "alice", 10.0)]);
        engine.set_column_filter("user", FilterValue::Range { min: Some(1.0), max: None });
        assert!(engine.view_state().column_filters.is_empty());
        engine.set_column_filter("query_id", FilterValue::Text("q".into()));
        assert!(engine.view_state().column_filters.is_empty());
    }

    #[test]
    fn end_to_end_alice() {
        // 7 rows, 3 of them alice's
        let mut engine = engine_with(vec![
            log_row("q1", "alice", 1.0),
            log_row("q2", "bob", 2.0),
            log_row("q3", "alice", 3.0),
            log_row("q4", "carol", 4.0),
            log_row("q5", "alice", 5.0),
            log_row("q6", "bob", 6.0),
            log_row("q7", "carol", 7.0),
        ]);

        engine.set_column_filter("user", FilterValue::Select("alice".into()));
        engine.set_page_size(10);

        assert_eq!(engine.filtered_row_count(), 3);
        assert_eq!(engine.page_count(), 1);
        assert_eq!(engine.displayed_page().len(), 3);
        assert_eq!(ids(&engine.displayed_page()), vec!["q1", "q3", "q5"]);
    }
}
