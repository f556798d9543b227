//! Column CSS classes and per-cell decoration.

mod computer;
mod text;

pub use computer::{
    apply_column_classes, classify_column, diff_class, HighlightTarget, StyleComputer,
    HIGHLIGHT_CLASS, INDEX_CLASS, INVALID_MARKER, NUMERIC_CLASS, SELECTED_CLASS,
};
pub use text::{adapt_to_grid, escape_html, tooltip_html, HIDDEN_CHARS_CLASS};
