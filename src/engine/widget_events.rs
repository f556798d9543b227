use super::{GridEngine, GridTask};
use crate::columns::detect_moved_column;
use crate::error::Result;
use crate::events::GridEvent;
use crate::headers::{HeaderFactory, HeaderHandle, HeaderRequest};
use crate::schedule::TaskKey;
use crate::tooltip::HoveredCell;
use crate::viewport::{GridWidget, Modifiers, WidgetEvent};

impl<G, F> GridEngine<G, F>
where
    G: GridWidget,
    F: HeaderFactory,
    F::Handle: HeaderHandle<Target = G::HeaderTarget>,
{
    /// Dispatch every queued widget notification, oldest first, until the
    /// queue stays empty.
    ///
    /// # Errors
    /// The first header attach failure. The other events are still handled.
    pub fn process_widget_events(&mut self) -> Result<()> {
        let mut first_error = None;
        loop {
            let events = self.viewport.widget_mut().drain_events();
            if events.is_empty() {
                break;
            }
            if self.is_torn_down() {
                tracing::debug!("Dropping {} widget events after teardown", events.len());
                continue;
            }
            for event in events {
                if let Err(e) = self.handle_widget_event(event) {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn handle_widget_event(&mut self, event: WidgetEvent<G::HeaderTarget>) -> Result<()> {
        match event {
            WidgetEvent::HeaderRendered { column_id, target } => {
                self.on_header_rendered(&column_id, &target)?;
            }
            WidgetEvent::HeaderDestroyRequested { column_id } => {
                self.headers.on_header_destroy_requested(&column_id);
            }
            WidgetEvent::HeaderClicked {
                column_id,
                modifiers,
            } => self.on_header_clicked(&column_id, modifiers),
            WidgetEvent::HeaderContextMenu { column_id } => self.on_header_context_menu(column_id),
            WidgetEvent::ColumnsReordered { ordering } => self.on_columns_reordered(&ordering),
            WidgetEvent::ActiveCellChanged { row, cell } => self.on_active_cell_changed(row, cell),
            WidgetEvent::PointerEnter { row, cell, x, y } => {
                let hovered = HoveredCell { row, cell, x, y };
                self.tooltip.on_pointer_enter(hovered);
                self.scheduler.cancel(&TaskKey::TOOLTIP_CONTENT);
                self.schedule(GridTask::TooltipProbe(hovered));
            }
            WidgetEvent::PointerLeave => {
                self.scheduler.cancel(&TaskKey::TOOLTIP_SHOW);
                self.scheduler.cancel(&TaskKey::TOOLTIP_CONTENT);
                if self.tooltip.on_pointer_leave() {
                    self.schedule(GridTask::TooltipHide);
                }
            }
            WidgetEvent::Scrolled => self.schedule(GridTask::RefreshPanel),
            WidgetEvent::ColumnResized { column_id, width } => {
                self.viewport.on_column_resized(&column_id, width);
                self.bus.emit(&GridEvent::ColumnResized { column_id, width });
            }
        }
        Ok(())
    }

    fn on_header_rendered(&mut self, column_id: &str, target: &G::HeaderTarget) -> Result<()> {
        let column = self.viewport.column(column_id);
        if column.is_none() {
            tracing::debug!("Header {} has no column, using the index header", column_id);
        }
        let request = HeaderRequest {
            column_id,
            metadata: column.and_then(|c| c.metadata.as_deref()),
            is_preview: column.is_some_and(|c| c.is_preview),
        };
        let outcome = self.headers.on_header_render_requested(request, target)?;
        tracing::trace!("Header {} rendered: {:?}", column_id, outcome);
        Ok(())
    }

    /// Plain click replaces the selection, ctrl toggles, shift extends.
    fn on_header_clicked(&mut self, column_id: &str, modifiers: Modifiers) {
        let columns = self.viewport.columns();
        let rows = &*self.rows;
        let changed = if modifiers.shift {
            self.selection.extend_range(column_id, columns, rows)
        } else if modifiers.ctrl {
            self.selection.toggle(column_id, columns, rows)
        } else {
            let line = self.selection.state().line_index();
            self.selection.set_selection(&[column_id], line, columns, rows)
        };
        if changed {
            self.on_selection_changed();
        }
    }

    fn on_header_context_menu(&mut self, column_id: String) {
        if !self.selection.state().contains(&column_id) {
            let line = self.selection.state().line_index();
            if self
                .selection
                .set_selection(&[&column_id], line, self.viewport.columns(), &*self.rows)
            {
                self.on_selection_changed();
            }
        }
        self.bus.emit(&GridEvent::HeaderMenuRequested { column_id });
    }

    /// An empty `ordering` means the grid did not say; ask it directly.
    fn on_columns_reordered(&mut self, ordering: &[String]) {
        let reported;
        let ordering = if ordering.is_empty() {
            reported = self.viewport.widget().column_ids();
            reported.as_slice()
        } else {
            ordering
        };
        let previous = self.viewport.on_columns_reordered(ordering);
        if let Some(moved) = detect_moved_column(&previous, self.viewport.columns()) {
            self.bus.emit(&GridEvent::ReorderDetected(moved));
        }
        // Selected columns follow visual order.
        if self.selection.reconcile(self.viewport.columns(), &*self.rows) {
            self.on_selection_changed();
        }
    }

    /// Select the line, and the column too unless it is the index column.
    fn on_active_cell_changed(&mut self, row: usize, cell: usize) {
        let Some(column) = self.viewport.column_at(cell) else {
            return;
        };
        let owned: Vec<String> = if column.selectable {
            vec![column.id.clone()]
        } else {
            self.selection
                .selected_ids()
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        let ids: Vec<&str> = owned.iter().map(String::as_str).collect();
        if self
            .selection
            .set_selection(&ids, Some(row), self.viewport.columns(), &*self.rows)
        {
            self.on_selection_changed();
        }
    }
}
