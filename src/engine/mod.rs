//! The owned state object that wires the components together.
//!
//! `GridEngine` replaces the shared mutable "grid state" of a UI framework:
//! every component is a field, every deferred recomputation is a typed
//! [`GridTask`] on one [`UpdateScheduler`], and every outward notification
//! goes through the [`EventBus`].
//!
//! The host drives it from two sides:
//! - widget notifications, queued by the widget and dispatched by
//!   [`GridEngine::process_widget_events`];
//! - time, by calling [`GridEngine::tick`] when [`GridEngine::next_deadline`]
//!   has passed.

mod task;
mod widget_events;

pub use task::GridTask;

use std::rc::Rc;

use serde_json::Value;

use crate::columns::ColumnBuilder;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::events::{EventBus, GridEvent, SubscriptionId};
use crate::headers::{HeaderFactory, HeaderHandle, HeaderPool};
use crate::rows::{FilterSet, MemoryRowStore, RowStore};
use crate::schedule::{Clock, TaskKey, UpdateScheduler};
use crate::selection::SelectionStore;
use crate::style::{apply_column_classes, HighlightTarget, StyleComputer};
use crate::tooltip::{HoveredCell, TextMeasurer, TooltipSizer, TooltipState};
use crate::types::{ColumnMetadata, DataPage};
use crate::viewport::{CellBox, ColumnWidthStore, GridWidget, ViewportController};

/// Column metadata and mode of the page currently loaded.
#[derive(Debug, Clone, Default)]
struct LoadedPage {
    columns: Vec<ColumnMetadata>,
    preview: bool,
}

/// Grid rendering synchronization engine.
pub struct GridEngine<G: GridWidget, F: HeaderFactory> {
    config: GridConfig,
    builder: ColumnBuilder,
    viewport: ViewportController<G>,
    headers: HeaderPool<F>,
    selection: SelectionStore,
    styles: StyleComputer,
    tooltip: TooltipSizer,
    scheduler: UpdateScheduler<GridTask>,
    rows: Box<dyn RowStore>,
    measurer: Box<dyn TextMeasurer>,
    bus: EventBus,
    page: Option<LoadedPage>,
    index_header_template: Option<String>,
}

impl<G, F> GridEngine<G, F>
where
    G: GridWidget,
    F: HeaderFactory,
    F::Handle: HeaderHandle<Target = G::HeaderTarget>,
{
    /// Create an engine around `widget`, with an in-memory row store.
    ///
    /// # Errors
    /// Returns [`GridError::Config`] if `config` fails validation.
    pub fn new(
        config: GridConfig,
        widget: G,
        factory: F,
        clock: Rc<dyn Clock>,
        measurer: Box<dyn TextMeasurer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: ColumnBuilder::from_config(&config),
            viewport: ViewportController::new(widget),
            headers: HeaderPool::new(factory),
            selection: SelectionStore::new(),
            styles: StyleComputer::new(),
            tooltip: TooltipSizer::new(config.tooltip_padding),
            scheduler: UpdateScheduler::new(clock),
            rows: Box::new(MemoryRowStore::default()),
            measurer,
            bus: EventBus::new(),
            page: None,
            index_header_template: None,
            config,
        })
    }

    #[must_use]
    pub fn with_row_store(mut self, rows: Box<dyn RowStore>) -> Self {
        self.rows = rows;
        self
    }

    #[must_use]
    pub fn with_width_store(mut self, store: Box<dyn ColumnWidthStore>) -> Self {
        self.viewport = self.viewport.with_width_store(store);
        self
    }

    /// Static header HTML of the index column.
    #[must_use]
    pub fn with_index_header_template(mut self, html: impl Into<String>) -> Self {
        self.index_header_template = Some(html.into());
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportController<G> {
        &self.viewport
    }

    /// Direct access to the widget, for host wiring only.
    pub fn widget_mut(&mut self) -> &mut G {
        self.viewport.widget_mut()
    }

    pub fn headers(&self) -> &HeaderPool<F> {
        &self.headers
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn styles(&self) -> &StyleComputer {
        &self.styles
    }

    pub fn tooltip(&self) -> &TooltipState {
        self.tooltip.state()
    }

    pub fn scheduler(&self) -> &UpdateScheduler<GridTask> {
        &self.scheduler
    }

    pub fn rows(&self) -> &dyn RowStore {
        &*self.rows
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Replace the data page.
    ///
    /// Rows are swapped immediately; the column rebuild is deferred under
    /// the `columns` key, and every header of the old page is disposed
    /// rather than pooled on the way.
    ///
    /// # Errors
    /// Header attach failures raised while the widget re-renders.
    pub fn load_page(&mut self, page: DataPage, dataset_id: Option<String>) -> Result<()> {
        let DataPage {
            metadata,
            records,
            preview,
        } = page;
        let column_count = metadata.columns.len();

        let change = self.rows.set_records(records);
        self.viewport.set_dataset_id(dataset_id);
        self.headers.set_renew_all(true);
        self.page = Some(LoadedPage {
            columns: metadata.columns,
            preview,
        });
        self.viewport.on_rows_changed(&change);
        let row_count = self.rows.row_count();
        tracing::info!(
            "Data page replaced: {} columns, {} rows{}",
            column_count,
            row_count,
            if preview { " (preview)" } else { "" }
        );

        self.schedule(GridTask::RebuildColumns);
        self.bus.emit(&GridEvent::DataPageReplaced {
            column_count,
            row_count,
            preview,
        });
        self.process_widget_events()
    }

    /// Earliest time the host should call [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    /// Run every due task. Returns how many ran.
    ///
    /// # Errors
    /// The first header attach failure. Remaining due tasks still run.
    pub fn tick(&mut self) -> Result<usize> {
        let ready = self.scheduler.take_due();
        let count = ready.len();
        let mut first_error = None;
        for task in ready {
            tracing::trace!("Running {} (scheduled at {:.0}ms)", task.key, task.scheduled_at);
            if let Err(e) = self.run_task(task.work) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(count), Err)
    }

    /// Highlight every cell of `column_id` displaying exactly `value`.
    pub fn highlight_cells_containing(&mut self, column_id: &str, value: &str) {
        self.schedule(GridTask::RefreshHighlight(Some(HighlightTarget {
            column_id: column_id.to_string(),
            value: value.to_string(),
        })));
    }

    pub fn reset_highlight(&mut self) {
        self.schedule(GridTask::RefreshHighlight(None));
    }

    /// Replace the row filter.
    ///
    /// # Errors
    /// Header attach failures raised while the widget re-renders.
    pub fn set_filters(&mut self, filters: FilterSet) -> Result<()> {
        tracing::debug!("Applying {} filter predicates", filters.len());
        let change = self.rows.set_filter(filters);
        self.viewport.on_rows_changed(&change);
        if self.selection.reconcile(self.viewport.columns(), &*self.rows) {
            self.on_selection_changed();
        }
        self.process_widget_events()
    }

    /// The lookup panel next to the grid opened or closed.
    pub fn set_lookup_visible(&mut self, visible: bool, available_height: f32) {
        tracing::debug!("Lookup visible: {}, grid height {}", visible, available_height);
        self.schedule(GridTask::ResizeViewport { available_height });
    }

    /// Select exactly `column_id`.
    ///
    /// # Errors
    /// [`GridError::UnknownColumn`] if it is not a selectable column.
    pub fn select_column(&mut self, column_id: &str) -> Result<()> {
        if self
            .selection
            .select_column_by_id(column_id, self.viewport.columns(), &*self.rows)?
        {
            self.on_selection_changed();
        }
        Ok(())
    }

    /// Scroll line `index` to the top and make it the active line.
    ///
    /// # Errors
    /// [`GridError::RowOutOfRange`] past the filtered row count.
    pub fn select_line(&mut self, index: usize) -> Result<()> {
        let len = self.rows.row_count();
        if index >= len {
            return Err(GridError::RowOutOfRange { index, len });
        }
        self.viewport.scroll_to_line(index);
        self.process_widget_events()
    }

    /// HTML of cell `cell` of filtered row `row`, as the grid displays it.
    pub fn format_cell(&self, row: usize, cell: usize) -> Option<String> {
        let record = self.rows.row(row)?;
        let column = self.viewport.column_at(cell)?;
        let raw = record.value(&column.field_key).unwrap_or(&Value::Null);
        Some(self.styles.format_cell(column, raw, record))
    }

    /// Stop all deferred work and release every header widget.
    ///
    /// Widget events arriving afterwards are dropped.
    pub fn teardown(&mut self) {
        self.scheduler.shutdown();
        self.headers.teardown();
        self.bus.clear();
        self.page = None;
        tracing::info!("Grid engine torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.scheduler.is_shut_down()
    }

    fn delay_of(&self, task: &GridTask) -> f64 {
        let config = &self.config;
        match task {
            GridTask::RebuildColumns => config.column_rebuild_delay_ms,
            GridTask::RefreshStyles => config.style_refresh_delay_ms,
            GridTask::RefreshHighlight(_) => config.highlight_delay_ms,
            GridTask::RefreshPanel => config.panel_refresh_delay_ms,
            GridTask::ResizeViewport { .. } => config.viewport_resize_delay_ms,
            GridTask::TooltipProbe(_) => config.tooltip_show_delay_ms,
            GridTask::TooltipReveal(_) => config.tooltip_content_delay_ms,
            GridTask::TooltipHide => config.tooltip_hide_delay_ms,
        }
    }

    fn schedule(&mut self, task: GridTask) {
        let delay = self.delay_of(&task);
        self.scheduler.schedule(task.key(), delay, task);
    }

    fn run_task(&mut self, task: GridTask) -> Result<()> {
        match task {
            GridTask::RebuildColumns => return self.rebuild_columns(),
            GridTask::RefreshStyles => self.refresh_styles(),
            GridTask::RefreshHighlight(target) => {
                match target {
                    Some(t) => self.styles.highlight_cells_containing(&t.column_id, &t.value),
                    None => self.styles.reset_highlight(),
                }
                self.viewport.invalidate();
            }
            GridTask::RefreshPanel => {
                let range = self.viewport.visible_row_range();
                self.bus.emit(&GridEvent::RangeVisibleChanged(range));
            }
            GridTask::ResizeViewport { available_height } => {
                self.viewport.resize_to(available_height);
            }
            GridTask::TooltipProbe(hovered) => self.probe_tooltip(hovered),
            GridTask::TooltipReveal(state) => {
                if self.tooltip.hovered().is_some() && self.tooltip.show(state) {
                    tracing::debug!("Tooltip shown");
                    self.bus
                        .emit(&GridEvent::TooltipChanged(self.tooltip.state().clone()));
                }
            }
            GridTask::TooltipHide => {
                if self.tooltip.hide() {
                    self.bus.emit(&GridEvent::TooltipChanged(TooltipState::default()));
                }
            }
        }
        self.process_widget_events()
    }

    /// Build the columns of the loaded page and push them into the grid.
    fn rebuild_columns(&mut self) -> Result<()> {
        let Some(page) = self.page.as_ref() else {
            return Ok(());
        };
        let mut columns = self.builder.create_columns(
            &page.columns,
            page.preview,
            self.index_header_template.as_deref(),
        );
        self.viewport.apply_saved_widths(&mut columns);
        self.selection.reconcile(&columns, &*self.rows);
        apply_column_classes(&mut columns, &self.selection.selected_ids());
        self.viewport.apply_columns(columns);

        // Destroy and render requests of this relayout belong to this pass.
        let result = self.process_widget_events();
        self.headers.set_renew_all(false);
        // Classes were applied above.
        self.scheduler.cancel(&TaskKey::STYLES);

        let column_ids: Vec<String> = self.viewport.columns().iter().map(|c| c.id.clone()).collect();
        tracing::debug!(
            "Columns rebuilt: {} columns, {} headers attached",
            column_ids.len(),
            self.headers.attached_count()
        );
        self.bus.emit(&GridEvent::ColumnsChanged { column_ids });
        self.emit_selection();
        result
    }

    fn refresh_styles(&mut self) {
        if self.scheduler.is_pending(&TaskKey::COLUMNS) {
            return;
        }
        let selected = self.selection.selected_ids();
        if apply_column_classes(self.viewport.columns_mut(), &selected) {
            self.viewport.refresh_column_classes();
        }
    }

    fn probe_tooltip(&mut self, hovered: HoveredCell) {
        let (Some(record), Some(column)) = (
            self.rows.row(hovered.row),
            self.viewport.column_at(hovered.cell),
        ) else {
            return;
        };
        if column.is_index() {
            return;
        }
        let text = record.display_value(&column.field_key);
        let cell = self
            .viewport
            .cell_box(hovered.row, hovered.cell)
            .unwrap_or(CellBox {
                width: column.width.unwrap_or(column.min_width),
                height: self.config.cell_height,
            });
        if let Some(state) = self.tooltip.probe(hovered, &text, cell, &*self.measurer) {
            self.schedule(GridTask::TooltipReveal(state));
        }
    }

    fn on_selection_changed(&mut self) {
        self.schedule(GridTask::RefreshStyles);
        self.emit_selection();
    }

    fn emit_selection(&mut self) {
        let event = GridEvent::SelectionChanged {
            column_ids: self
                .selection
                .selected_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
            line: self.selection.state().line_index(),
        };
        self.bus.emit(&event);
    }
}
