use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use js_sys::{Array, Function};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use super::{
    CanvasTextMeasurer, DomHeaderFactory, EventQueue, JsGridWidget, LocalStorageWidthStore,
    PerformanceClock, TimerDriver,
};
use crate::config::GridConfig;
use crate::engine::GridEngine;
use crate::error::GridError;
use crate::rows::FilterSet;
use crate::schedule::Clock;
use crate::types::{DataPage, Row};

type Engine = GridEngine<JsGridWidget, DomHeaderFactory>;

/// Line height of the measuring canvas, in CSS pixels.
const MEASURE_LINE_HEIGHT: f32 = 16.0;

struct ViewState {
    engine: Engine,
    timer: TimerDriver,
}

/// State reachable from the JS callbacks.
struct Shared {
    view: RefCell<ViewState>,
    /// Serialized engine events, delivered once the engine is released.
    outbox: Rc<RefCell<VecDeque<JsValue>>>,
    listeners: RefCell<Vec<Function>>,
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn report(e: &GridError) {
    web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
}

/// A data grid kept in sync with its data pages, selection and styles.
///
/// Events are delivered to `onEvent` callbacks as plain objects with a
/// `type` field (`dataPageReplaced`, `columnsChanged`, `selectionChanged`,
/// `reorderDetected`, `rangeVisibleChanged`, `headerMenuRequested`,
/// `columnResized`, `tooltipChanged`).
///
/// The grid adapter must defer painting: `render` and `invalidate` may only
/// request a frame. While the view is inside a call, `formatCell` cannot
/// reach the engine and returns `undefined`, so a synchronous paint draws
/// blank cells.
#[wasm_bindgen]
pub struct GridView {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl GridView {
    /// Wrap a JS grid adapter.
    ///
    /// `measure_canvas` is an offscreen canvas whose context font matches
    /// the grid cells. `config` is an optional partial `GridConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        grid: JsValue,
        measure_canvas: HtmlCanvasElement,
        config: JsValue,
    ) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let queue = Rc::new(EventQueue::default());
        let widget = JsGridWidget::new(grid, Rc::clone(&queue));
        let measurer = CanvasTextMeasurer::new(&measure_canvas, None, MEASURE_LINE_HEIGHT)?;
        let clock: Rc<dyn Clock> = Rc::new(PerformanceClock);
        let mut engine = GridEngine::new(
            config,
            widget,
            DomHeaderFactory::new(document),
            clock,
            Box::new(measurer),
        )?;
        if let Some(store) = LocalStorageWidthStore::new() {
            engine = engine.with_width_store(Box::new(store));
        }

        let outbox = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&outbox);
        engine.subscribe(move |event| match serde_wasm_bindgen::to_value(event) {
            Ok(value) => sink.borrow_mut().push_back(value),
            Err(e) => tracing::warn!("Could not serialize {:?}: {}", event, e),
        });

        let shared = Rc::new(Shared {
            view: RefCell::new(ViewState {
                engine,
                timer: TimerDriver::default(),
            }),
            outbox,
            listeners: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&shared);
        let on_timer = Closure::wrap(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                Self::handle_timer(&shared);
            }
        }) as Box<dyn FnMut()>);
        shared.view.borrow_mut().timer.set_callback(on_timer);

        let weak = Rc::downgrade(&shared);
        queue.set_wake(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                Self::pump(&shared);
            }
        }));

        Ok(GridView { shared })
    }

    /// Replace the data page (`{ metadata: { columns }, records, preview }`).
    pub fn load(&self, page: JsValue, dataset_id: Option<String>) -> Result<(), JsValue> {
        let page: DataPage = serde_wasm_bindgen::from_value(page).map_err(js_error)?;
        self.with_engine(|engine| engine.load_page(page, dataset_id))?
            .map_err(JsValue::from)
    }

    pub fn highlight(&self, column_id: &str, value: &str) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.highlight_cells_containing(column_id, value))
    }

    #[wasm_bindgen(js_name = resetHighlight)]
    pub fn reset_highlight(&self) -> Result<(), JsValue> {
        self.with_engine(Engine::reset_highlight)
    }

    #[wasm_bindgen(js_name = setLookupVisible)]
    pub fn set_lookup_visible(&self, visible: bool, available_height: f32) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.set_lookup_visible(visible, available_height))
    }

    /// Filter rows with JS predicates `(record) => boolean`, combined with AND.
    ///
    /// Predicates must not call back into the view.
    #[wasm_bindgen(js_name = setFilters)]
    pub fn set_filters(&self, predicates: Array) -> Result<(), JsValue> {
        let mut filters = FilterSet::new();
        for predicate in predicates.iter() {
            let function: Function = predicate
                .dyn_into()
                .map_err(|_| JsValue::from_str("Filter predicates must be functions"))?;
            filters.push(move |row: &Row| {
                serde_wasm_bindgen::to_value(row)
                    .ok()
                    .and_then(|record| function.call1(&JsValue::NULL, &record).ok())
                    .is_some_and(|matched| matched.is_truthy())
            });
        }
        self.with_engine(|engine| engine.set_filters(filters))?
            .map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = selectColumn)]
    pub fn select_column(&self, column_id: &str) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.select_column(column_id))?
            .map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = selectLine)]
    pub fn select_line(&self, index: usize) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.select_line(index))?
            .map_err(JsValue::from)
    }

    /// Cell HTML for the grid's formatter. `undefined` when the cell does not
    /// exist, or when called from inside another view call (see the type
    /// docs on deferred painting).
    #[wasm_bindgen(js_name = formatCell)]
    pub fn format_cell(&self, row: usize, cell: usize) -> Option<String> {
        let view = self.shared.view.try_borrow().ok()?;
        view.engine.format_cell(row, cell)
    }

    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        self.shared.listeners.borrow_mut().push(callback);
    }

    /// Ids of the selected columns, in visual order.
    #[wasm_bindgen(js_name = selectedColumns)]
    pub fn selected_columns(&self) -> Result<JsValue, JsValue> {
        let view = self
            .shared
            .view
            .try_borrow()
            .map_err(|_| JsValue::from_str("GridView is busy"))?;
        serde_wasm_bindgen::to_value(&view.engine.selection().selected_ids()).map_err(js_error)
    }

    /// Current tooltip state (`{ visible, x, y, contentHtml }`).
    pub fn tooltip(&self) -> Result<JsValue, JsValue> {
        let view = self
            .shared
            .view
            .try_borrow()
            .map_err(|_| JsValue::from_str("GridView is busy"))?;
        serde_wasm_bindgen::to_value(view.engine.tooltip()).map_err(js_error)
    }

    /// Cancel pending work, release header widgets and unsubscribe from the
    /// grid. The view is inert afterwards.
    pub fn destroy(&self) -> Result<(), JsValue> {
        let mut view = self
            .shared
            .view
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("GridView is busy"))?;
        view.timer.cancel();
        view.engine.teardown();
        view.engine.widget_mut().unsubscribe_all();
        drop(view);
        self.shared.listeners.borrow_mut().clear();
        self.shared.outbox.borrow_mut().clear();
        Ok(())
    }
}

impl GridView {
    /// Run `f` on the engine, re-arm the timer, then deliver events.
    fn with_engine<T>(&self, f: impl FnOnce(&mut Engine) -> T) -> Result<T, JsValue> {
        let result = {
            let mut view = self
                .shared
                .view
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("GridView is busy"))?;
            let result = f(&mut view.engine);
            let deadline = view.engine.next_deadline();
            view.timer.arm(deadline);
            result
        };
        Self::flush(&self.shared);
        Ok(result)
    }

    fn handle_timer(shared: &Rc<Shared>) {
        {
            // A busy view re-arms the timer itself when it is done.
            let Ok(mut view) = shared.view.try_borrow_mut() else {
                return;
            };
            view.timer.fired();
            if let Err(e) = view.engine.tick() {
                report(&e);
            }
            let deadline = view.engine.next_deadline();
            view.timer.arm(deadline);
        }
        Self::flush(shared);
    }

    /// Widget notification outside of an engine call (user input).
    fn pump(shared: &Rc<Shared>) {
        {
            // Inside an engine call the engine drains the queue itself.
            let Ok(mut view) = shared.view.try_borrow_mut() else {
                return;
            };
            if let Err(e) = view.engine.process_widget_events() {
                report(&e);
            }
            let deadline = view.engine.next_deadline();
            view.timer.arm(deadline);
        }
        Self::flush(shared);
    }

    fn flush(shared: &Shared) {
        loop {
            let Some(event) = shared.outbox.borrow_mut().pop_front() else {
                break;
            };
            let listeners = shared.listeners.borrow().clone();
            for listener in &listeners {
                if let Err(e) = listener.call1(&JsValue::NULL, &event) {
                    web_sys::console::error_1(&e);
                }
            }
        }
    }
}
