//! Column classes and cell markup.
//!
//! Highlighting goes through [`StyleComputer::format_cell`] only, never
//! through direct DOM mutation, so it survives any re-render of the grid.

use serde_json::Value;

use super::text::{adapt_to_grid, escape_html};
use crate::types::{display_value, CellFormatter, ColumnDefinition, DiffKind, Row};

pub const INDEX_CLASS: &str = "index";
pub const SELECTED_CLASS: &str = "selected";
pub const NUMERIC_CLASS: &str = "numeric";
pub const HIGHLIGHT_CLASS: &str = "highlight";
/// Trailing marker appended to values flagged invalid by column quality.
pub const INVALID_MARKER: &str = r#"<div title="Invalid Value" class="red-rect"></div>"#;

/// The single (column, value) pair currently highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightTarget {
    pub column_id: String,
    pub value: String,
}

/// Preview class of a row or cell marker.
pub fn diff_class(diff: DiffKind) -> &'static str {
    match diff {
        DiffKind::New => "cellNewValue",
        DiffKind::Updated => "cellUpdateValue",
        DiffKind::Deleted => "cellDeletedValue",
    }
}

/// CSS class of a column given the selected column ids.
///
/// The index column always gets `index`; other columns collect `selected`
/// and `numeric` as they apply, and may end up with no class at all.
pub fn classify_column(column: &ColumnDefinition, selected_ids: &[&str]) -> String {
    if column.is_index() {
        return INDEX_CLASS.to_string();
    }
    let mut classes: Vec<&str> = Vec::with_capacity(2);
    if selected_ids.contains(&column.id.as_str()) {
        classes.push(SELECTED_CLASS);
    }
    if column.simplified_type().is_numeric() {
        classes.push(NUMERIC_CLASS);
    }
    classes.join(" ")
}

/// Set `css_class` on every column. Returns whether any class changed.
pub fn apply_column_classes(columns: &mut [ColumnDefinition], selected_ids: &[&str]) -> bool {
    let mut changed = false;
    for column in columns.iter_mut() {
        let class = classify_column(column, selected_ids);
        let next = (!class.is_empty()).then_some(class);
        if column.css_class != next {
            column.css_class = next;
            changed = true;
        }
    }
    changed
}

/// Per-cell decoration state.
#[derive(Debug, Default, Clone)]
pub struct StyleComputer {
    highlight: Option<HighlightTarget>,
}

impl StyleComputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&self) -> Option<&HighlightTarget> {
        self.highlight.as_ref()
    }

    /// Highlight every cell of `column_id` whose display value equals `value`.
    pub fn highlight_cells_containing(&mut self, column_id: &str, value: &str) {
        self.highlight = Some(HighlightTarget {
            column_id: column_id.to_string(),
            value: value.to_string(),
        });
    }

    pub fn reset_highlight(&mut self) {
        self.highlight = None;
    }

    fn is_highlighted(&self, column_id: &str, text: &str) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|h| h.column_id == column_id && h.value == text)
    }

    /// Render one cell as HTML.
    pub fn format_cell(&self, column: &ColumnDefinition, raw: &Value, row: &Row) -> String {
        let text = display_value(raw);
        if column.formatter == CellFormatter::Index {
            return format!(r#"<div class="index-cell">{}</div>"#, escape_html(&text));
        }

        let mut content = adapt_to_grid(&text);
        if self.is_highlighted(&column.id, &text) {
            content = format!(r#"<span class="{HIGHLIGHT_CLASS}">{content}</span>"#);
        }

        let mut classes: Vec<&str> = Vec::with_capacity(2);
        if let Some(diff) = row.row_diff() {
            classes.push(diff_class(diff));
        }
        if let Some(diff) = row.cell_diff(&column.id) {
            let class = diff_class(diff);
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        if !classes.is_empty() {
            if content.is_empty() {
                content.push(' ');
            }
            content = format!(r#"<div class="{}">{content}</div>"#, classes.join(" "));
        }

        let invalid = column
            .metadata
            .as_deref()
            .is_some_and(|meta| meta.quality.is_invalid(&text));
        if invalid {
            content.push_str(INVALID_MARKER);
        }
        content
    }
}
