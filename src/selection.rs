//! Column and line selection.
//!
//! Selections are expressed as column ids and resolved against the current
//! column set on every operation. The stored metadata is therefore always
//! fresh after a data-page swap, and the selected columns always follow the
//! visual left-to-right order rather than click order.

use std::collections::HashMap;

use crate::error::{GridError, Result};
use crate::rows::RowStore;
use crate::types::{ColumnDefinition, ColumnMetadata, SelectedLine, SelectionState};

/// Holds the authoritative [`SelectionState`].
#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    state: SelectionState,
    /// Value occurrences within the filtered rows, for a single selected column.
    occurrences: HashMap<String, usize>,
}

/// Visual positions of the selectable columns, keyed by id.
fn selectable(columns: &[ColumnDefinition]) -> impl Iterator<Item = (usize, &ColumnDefinition)> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.selectable && !c.is_index())
}

fn position_of(columns: &[ColumnDefinition], id: &str) -> Option<usize> {
    selectable(columns).find(|(_, c)| c.id == id).map(|(i, _)| i)
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected_columns(&self) -> &[ColumnMetadata] {
        &self.state.columns
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.state.column_ids()
    }

    pub fn selected_line(&self) -> Option<&SelectedLine> {
        self.state.line.as_ref()
    }

    /// Per-value counts of the single selected column; empty otherwise.
    pub fn occurrences(&self) -> &HashMap<String, usize> {
        &self.occurrences
    }

    /// Replace the selection wholesale. Returns whether it changed.
    ///
    /// Ids missing from `columns`, duplicates and the index column are
    /// dropped. An out-of-range `line_index` clears the line selection.
    pub fn set_selection(
        &mut self,
        column_ids: &[&str],
        line_index: Option<usize>,
        columns: &[ColumnDefinition],
        rows: &dyn RowStore,
    ) -> bool {
        let previous = std::mem::take(&mut self.state);
        self.state.columns = selectable(columns)
            .filter(|(_, c)| column_ids.contains(&c.id.as_str()))
            .filter_map(|(_, c)| c.metadata.as_deref().cloned())
            .collect();
        self.state.line = line_index.and_then(|index| {
            rows.row(index).map(|record| SelectedLine {
                index,
                record: record.clone(),
            })
        });
        self.recount(rows);
        previous != self.state
    }

    /// Add `column_id` if absent, remove it if present.
    pub fn toggle(
        &mut self,
        column_id: &str,
        columns: &[ColumnDefinition],
        rows: &dyn RowStore,
    ) -> bool {
        let mut owned: Vec<String> = self.state.columns.iter().map(|c| c.id.clone()).collect();
        if let Some(i) = owned.iter().position(|id| id == column_id) {
            owned.remove(i);
        } else {
            owned.push(column_id.to_string());
        }
        let ids: Vec<&str> = owned.iter().map(String::as_str).collect();
        let line = self.state.line_index();
        self.set_selection(&ids, line, columns, rows)
    }

    /// Select the contiguous visual range between the current selection and
    /// `column_id`.
    ///
    /// Left of the selection the range ends at the rightmost selected column;
    /// otherwise it starts at the leftmost one.
    pub fn extend_range(
        &mut self,
        column_id: &str,
        columns: &[ColumnDefinition],
        rows: &dyn RowStore,
    ) -> bool {
        let line = self.state.line_index();
        let Some(target) = position_of(columns, column_id) else {
            return false;
        };
        let positions: Vec<usize> = self
            .state
            .columns
            .iter()
            .filter_map(|c| position_of(columns, &c.id))
            .collect();
        let (Some(&min), Some(&max)) = (positions.iter().min(), positions.iter().max()) else {
            return self.set_selection(&[column_id], line, columns, rows);
        };

        let range = if target < min { target..=max } else { min..=target };
        let ids: Vec<&str> = selectable(columns)
            .filter(|(i, _)| range.contains(i))
            .map(|(_, c)| c.id.as_str())
            .collect();
        self.set_selection(&ids, line, columns, rows)
    }

    /// Re-resolve the selection after the column set or rows were replaced.
    ///
    /// Columns that disappeared are dropped; if none survive, the first data
    /// column is selected instead. A line that is no longer materialized is
    /// cleared.
    pub fn reconcile(&mut self, columns: &[ColumnDefinition], rows: &dyn RowStore) -> bool {
        let had_columns = !self.state.columns.is_empty();
        let owned: Vec<String> = self.state.columns.iter().map(|c| c.id.clone()).collect();
        let mut ids: Vec<&str> = owned
            .iter()
            .map(String::as_str)
            .filter(|id| position_of(columns, id).is_some())
            .collect();
        if had_columns && ids.is_empty() {
            if let Some((_, first)) = selectable(columns).next() {
                tracing::debug!("Selected columns vanished, falling back to {}", first.id);
                ids.push(first.id.as_str());
            }
        }
        let line = self.state.line_index();
        self.set_selection(&ids, line, columns, rows)
    }

    /// Select exactly `column_id`, keeping the selected line.
    ///
    /// # Errors
    /// [`GridError::UnknownColumn`] if the id is not a selectable column.
    pub fn select_column_by_id(
        &mut self,
        column_id: &str,
        columns: &[ColumnDefinition],
        rows: &dyn RowStore,
    ) -> Result<bool> {
        if position_of(columns, column_id).is_none() {
            return Err(GridError::UnknownColumn(column_id.to_string()));
        }
        let line = self.state.line_index();
        Ok(self.set_selection(&[column_id], line, columns, rows))
    }

    /// Recompute occurrences after the filtered row set changed.
    pub fn refresh_occurrences(&mut self, rows: &dyn RowStore) {
        self.recount(rows);
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.state.is_empty();
        self.state = SelectionState::default();
        self.occurrences.clear();
        changed
    }

    fn recount(&mut self, rows: &dyn RowStore) {
        self.occurrences.clear();
        let [column] = self.state.columns.as_slice() else {
            return;
        };
        for row in rows.rows() {
            *self
                .occurrences
                .entry(row.display_value(&column.id))
                .or_insert(0) += 1;
        }
    }
}
