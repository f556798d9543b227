//! The virtualized grid widget contract and the controller around it.
//!
//! The widget renders only what is on screen; everything it needs to know
//! about columns, classes and row changes flows through
//! [`ViewportController`]. Widget callbacks are not invoked re-entrantly:
//! the widget queues them as [`WidgetEvent`]s and the engine drains the queue
//! right after each call, within the same pass.

mod controller;
mod widths;

pub use controller::ViewportController;
pub use widths::{ColumnWidthStore, ColumnWidths, MemoryWidthStore};

use serde::Serialize;

use crate::types::ColumnDefinition;

/// Inclusive range of rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowRange {
    pub top: usize,
    pub bottom: usize,
}

/// Box of a rendered cell, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellBox {
    pub width: f32,
    pub height: f32,
}

/// Keyboard modifiers of a header click. `ctrl` also covers meta/cmd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

/// A notification from the grid widget. `T` is the header render target.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent<T> {
    HeaderRendered { column_id: String, target: T },
    HeaderDestroyRequested { column_id: String },
    HeaderClicked { column_id: String, modifiers: Modifiers },
    HeaderContextMenu { column_id: String },
    /// New visual order of the column ids after a drag. Empty when the grid
    /// only signals that a drag happened.
    ColumnsReordered { ordering: Vec<String> },
    ActiveCellChanged { row: usize, cell: usize },
    PointerEnter { row: usize, cell: usize, x: f32, y: f32 },
    PointerLeave,
    Scrolled,
    ColumnResized { column_id: String, width: f32 },
}

/// A virtualized grid widget.
pub trait GridWidget {
    type HeaderTarget;

    /// Replace the column set. Full relayout; the widget queues header
    /// destroy events for old headers and render events for new ones.
    fn apply_columns(&mut self, columns: &[ColumnDefinition]);

    /// Push new `css_class` values of the current columns without relayout.
    fn update_column_classes(&mut self, columns: &[ColumnDefinition]);

    fn invalidate(&mut self);

    fn invalidate_rows(&mut self, rows: &[usize]);

    fn update_row_count(&mut self);

    fn render(&mut self);

    fn resize_canvas(&mut self);

    fn scroll_row_to_top(&mut self, row: usize);

    /// Column ids in current visual order.
    fn column_ids(&self) -> Vec<String>;

    fn visible_row_range(&self) -> RowRange;

    fn scroll_cell_into_view(&mut self, row: usize, cell: usize);

    fn set_active_cell(&mut self, row: usize, cell: usize);

    /// Rendered box of a cell, if it is on screen.
    fn cell_box(&self, row: usize, cell: usize) -> Option<CellBox>;

    /// Take every queued notification, oldest first.
    fn drain_events(&mut self) -> Vec<WidgetEvent<Self::HeaderTarget>>;
}
