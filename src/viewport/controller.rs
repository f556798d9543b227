use super::{CellBox, ColumnWidthStore, ColumnWidths, GridWidget, RowRange};
use crate::rows::RowStoreChange;
use crate::types::ColumnDefinition;

/// Thin façade over the virtualized grid widget.
///
/// Owns the column set currently pushed into the widget and the optional
/// width persistence for the active dataset.
pub struct ViewportController<G: GridWidget> {
    widget: G,
    columns: Vec<ColumnDefinition>,
    width_store: Option<Box<dyn ColumnWidthStore>>,
    dataset_id: Option<String>,
    available_height: Option<f32>,
}

impl<G: GridWidget> ViewportController<G> {
    pub fn new(widget: G) -> Self {
        Self {
            widget,
            columns: Vec::new(),
            width_store: None,
            dataset_id: None,
            available_height: None,
        }
    }

    #[must_use]
    pub fn with_width_store(mut self, store: Box<dyn ColumnWidthStore>) -> Self {
        self.width_store = Some(store);
        self
    }

    pub fn widget(&self) -> &G {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut G {
        &mut self.widget
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Mutable access for in-place updates (`css_class`, `width`).
    pub fn columns_mut(&mut self) -> &mut [ColumnDefinition] {
        &mut self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Column rendered at widget cell index `cell`.
    pub fn column_at(&self, cell: usize) -> Option<&ColumnDefinition> {
        self.columns.get(cell)
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn set_dataset_id(&mut self, dataset_id: Option<String>) {
        self.dataset_id = dataset_id;
    }

    /// Apply persisted widths of the active dataset to `columns`.
    pub fn apply_saved_widths(&self, columns: &mut [ColumnDefinition]) {
        let (Some(store), Some(dataset)) = (self.width_store.as_ref(), self.dataset_id.as_deref())
        else {
            return;
        };
        let widths = store.load(dataset);
        for column in columns.iter_mut().filter(|c| c.resizable) {
            if let Some(&width) = widths.get(&column.id) {
                column.width = Some(width.max(column.min_width));
            }
        }
    }

    /// Replace the column set and relayout the widget.
    pub fn apply_columns(&mut self, columns: Vec<ColumnDefinition>) {
        self.columns = columns;
        self.widget.apply_columns(&self.columns);
        tracing::debug!("Applied {} columns", self.columns.len());
    }

    /// Push class changes of the current columns and redraw.
    pub fn refresh_column_classes(&mut self) {
        self.widget.update_column_classes(&self.columns);
        self.widget.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.widget.invalidate();
    }

    pub fn visible_row_range(&self) -> RowRange {
        self.widget.visible_row_range()
    }

    pub fn cell_box(&self, row: usize, cell: usize) -> Option<CellBox> {
        self.widget.cell_box(row, cell)
    }

    /// Re-render after a row store mutation.
    pub fn on_rows_changed(&mut self, change: &RowStoreChange) {
        if change.row_count_changed {
            self.widget.update_row_count();
        }
        if !change.changed_rows.is_empty() {
            self.widget.invalidate_rows(&change.changed_rows);
        }
        if !change.is_empty() {
            self.widget.render();
        }
    }

    /// Follow a drag-reorder done in the widget. Returns the previous order.
    ///
    /// Non-reorderable columns (the index column) stay in front whatever
    /// `ordering` says. Ids unknown to the current column set are ignored;
    /// columns missing from `ordering` keep their relative order at the end.
    pub fn on_columns_reordered(&mut self, ordering: &[String]) -> Vec<ColumnDefinition> {
        let previous = self.columns.clone();
        let (mut reordered, mut remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.columns)
            .into_iter()
            .partition(|c| !c.reorderable);
        reordered.reserve(remaining.len());
        for id in ordering {
            if let Some(i) = remaining.iter().position(|c| &c.id == id) {
                reordered.push(remaining.remove(i));
            }
        }
        reordered.append(&mut remaining);
        self.columns = reordered;
        previous
    }

    /// Record a user resize and persist all current widths.
    pub fn on_column_resized(&mut self, column_id: &str, width: f32) {
        let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) else {
            return;
        };
        column.width = Some(width.max(column.min_width));

        let (Some(store), Some(dataset)) = (self.width_store.as_mut(), self.dataset_id.as_deref())
        else {
            return;
        };
        let widths: ColumnWidths = self
            .columns
            .iter()
            .filter(|c| c.resizable)
            .filter_map(|c| c.width.map(|w| (c.id.clone(), w)))
            .collect();
        store.save(dataset, &widths);
    }

    pub fn available_height(&self) -> Option<f32> {
        self.available_height
    }

    /// Container height changed (e.g. a side panel opened).
    pub fn resize_to(&mut self, available_height: f32) {
        self.available_height = Some(available_height);
        self.widget.resize_canvas();
    }

    /// Bring line `row` to the top and make its first data cell active.
    pub fn scroll_to_line(&mut self, row: usize) {
        let cell = self
            .columns
            .iter()
            .position(|c| !c.is_index())
            .unwrap_or(0);
        self.widget.scroll_row_to_top(row);
        self.widget.scroll_cell_into_view(row, cell);
        self.widget.set_active_cell(row, cell);
    }
}
