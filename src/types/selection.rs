use super::column::ColumnMetadata;
use super::row::Row;

/// Selected line of the grid: its index in the filtered rows plus the record.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLine {
    pub index: usize,
    pub record: Row,
}

/// Authoritative column/line selection.
///
/// `columns` never holds duplicates and is kept in ascending visual order.
/// A line is only present while its record is materialized in the data page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub columns: Vec<ColumnMetadata>,
    pub line: Option<SelectedLine>,
}

impl SelectionState {
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.columns.iter().any(|c| c.id == column_id)
    }

    pub fn line_index(&self) -> Option<usize> {
        self.line.as_ref().map(|l| l.index)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.line.is_none()
    }
}
