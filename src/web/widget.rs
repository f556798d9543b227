//! [`GridWidget`] over a JavaScript virtualized grid.
//!
//! The JS object is driven by method name through `Reflect`, so any grid can
//! be plugged in behind a thin adapter exposing `setColumns`,
//! `updateColumnClasses`, `invalidate`, `invalidateRows`, `updateRowCount`,
//! `render`, `resizeCanvas`, `scrollRowToTop`, `getColumns`, `getViewport`,
//! `scrollCellIntoView`, `setActiveCell`, `getCellNodeBox`,
//! `subscribe(name, handler)` and `unsubscribe`.
//!
//! `render` and `invalidate` must only request a paint (next animation
//! frame): cell formatters call back into the view, which is busy for the
//! whole duration of a widget call. Header notifications may fire
//! synchronously; they are queued and drained in the same pass.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use crate::types::ColumnDefinition;
use crate::viewport::{CellBox, GridWidget, Modifiers, RowRange, WidgetEvent};

/// Widget notifications waiting for the engine, plus the hook that wakes it.
#[derive(Default)]
pub struct EventQueue {
    events: RefCell<VecDeque<WidgetEvent<Element>>>,
    wake: RefCell<Option<Box<dyn Fn()>>>,
}

impl EventQueue {
    pub fn set_wake(&self, wake: Box<dyn Fn()>) {
        *self.wake.borrow_mut() = Some(wake);
    }

    fn push(&self, event: WidgetEvent<Element>) {
        self.events.borrow_mut().push_back(event);
        if let Some(wake) = self.wake.borrow().as_ref() {
            wake();
        }
    }

    fn drain(&self) -> Vec<WidgetEvent<Element>> {
        self.events.borrow_mut().drain(..).collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnArgs {
    column_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClickArgs {
    column_id: String,
    #[serde(default)]
    ctrl_key: bool,
    #[serde(default)]
    meta_key: bool,
    #[serde(default)]
    shift_key: bool,
}

#[derive(Deserialize)]
struct ReorderArgs {
    #[serde(default)]
    ordering: Vec<String>,
}

#[derive(Deserialize)]
struct CellArgs {
    row: usize,
    cell: usize,
}

#[derive(Deserialize)]
struct PointerArgs {
    row: usize,
    cell: usize,
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResizeArgs {
    column_id: String,
    width: f32,
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Deserialize)]
struct NodeBox {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

fn parse<T: DeserializeOwned>(value: JsValue) -> Option<T> {
    match serde_wasm_bindgen::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Malformed grid event payload: {}", e);
            None
        }
    }
}

fn header_rendered(args: JsValue) -> Option<WidgetEvent<Element>> {
    let node = Reflect::get(&args, &JsValue::from_str("node"))
        .ok()?
        .dyn_into::<Element>()
        .ok()?;
    let ColumnArgs { column_id } = parse(args)?;
    Some(WidgetEvent::HeaderRendered {
        column_id,
        target: node,
    })
}

fn header_destroy(args: JsValue) -> Option<WidgetEvent<Element>> {
    let ColumnArgs { column_id } = parse(args)?;
    Some(WidgetEvent::HeaderDestroyRequested { column_id })
}

fn header_click(args: JsValue) -> Option<WidgetEvent<Element>> {
    let click: ClickArgs = parse(args)?;
    Some(WidgetEvent::HeaderClicked {
        column_id: click.column_id,
        modifiers: Modifiers {
            ctrl: click.ctrl_key || click.meta_key,
            shift: click.shift_key,
        },
    })
}

fn header_context_menu(args: JsValue) -> Option<WidgetEvent<Element>> {
    let ColumnArgs { column_id } = parse(args)?;
    Some(WidgetEvent::HeaderContextMenu { column_id })
}

fn columns_reordered(args: JsValue) -> Option<WidgetEvent<Element>> {
    let ReorderArgs { ordering } = parse(args)?;
    Some(WidgetEvent::ColumnsReordered { ordering })
}

fn active_cell_changed(args: JsValue) -> Option<WidgetEvent<Element>> {
    let CellArgs { row, cell } = parse(args)?;
    Some(WidgetEvent::ActiveCellChanged { row, cell })
}

fn mouse_enter(args: JsValue) -> Option<WidgetEvent<Element>> {
    let PointerArgs { row, cell, x, y } = parse(args)?;
    Some(WidgetEvent::PointerEnter { row, cell, x, y })
}

fn mouse_leave(_args: JsValue) -> Option<WidgetEvent<Element>> {
    Some(WidgetEvent::PointerLeave)
}

fn scrolled(_args: JsValue) -> Option<WidgetEvent<Element>> {
    Some(WidgetEvent::Scrolled)
}

fn columns_resized(args: JsValue) -> Option<WidgetEvent<Element>> {
    let ResizeArgs { column_id, width } = parse(args)?;
    Some(WidgetEvent::ColumnResized { column_id, width })
}

type Translate = fn(JsValue) -> Option<WidgetEvent<Element>>;

/// Grid event names and how their payload becomes a [`WidgetEvent`].
const SUBSCRIPTIONS: [(&str, Translate); 10] = [
    ("headerCellRendered", header_rendered),
    ("beforeHeaderCellDestroy", header_destroy),
    ("headerClick", header_click),
    ("headerContextMenu", header_context_menu),
    ("columnsReordered", columns_reordered),
    ("activeCellChanged", active_cell_changed),
    ("mouseEnter", mouse_enter),
    ("mouseLeave", mouse_leave),
    ("scroll", scrolled),
    ("columnsResized", columns_resized),
];

fn handler(closure: &Closure<dyn FnMut(JsValue)>) -> JsValue {
    let value: &JsValue = closure.as_ref();
    value.clone()
}

/// The JS grid plus the closures it calls back into.
pub struct JsGridWidget {
    grid: JsValue,
    queue: Rc<EventQueue>,
    closures: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl JsGridWidget {
    /// Wrap `grid` and subscribe to all of its notifications.
    pub fn new(grid: JsValue, queue: Rc<EventQueue>) -> Self {
        let mut widget = Self {
            grid,
            queue,
            closures: Vec::with_capacity(SUBSCRIPTIONS.len()),
        };
        for (name, translate) in SUBSCRIPTIONS {
            let queue = Rc::clone(&widget.queue);
            let closure = Closure::wrap(Box::new(move |args: JsValue| {
                if let Some(event) = translate(args) {
                    queue.push(event);
                }
            }) as Box<dyn FnMut(JsValue)>);
            widget.call("subscribe", &[JsValue::from_str(name), handler(&closure)]);
            widget.closures.push(closure);
        }
        widget
    }

    /// Stop listening. Late notifications from the grid are ignored.
    pub fn unsubscribe_all(&mut self) {
        for ((name, _), closure) in SUBSCRIPTIONS.iter().zip(&self.closures) {
            self.call("unsubscribe", &[JsValue::from_str(name), handler(closure)]);
        }
        self.closures.clear();
    }

    fn call(&self, method: &str, args: &[JsValue]) -> Option<JsValue> {
        let function = Reflect::get(&self.grid, &JsValue::from_str(method))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        let args: Array = args.iter().collect();
        match function.apply(&self.grid, &args) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("grid.{}() failed: {:?}", method, e);
                None
            }
        }
    }

    fn query<T: DeserializeOwned>(&self, method: &str, args: &[JsValue]) -> Option<T> {
        let value = self.call(method, args)?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(value).ok()
    }

    fn push_columns(&self, method: &str, columns: &[ColumnDefinition]) {
        match serde_wasm_bindgen::to_value(columns) {
            Ok(value) => {
                self.call(method, &[value]);
            }
            Err(e) => tracing::warn!("Could not serialize columns: {}", e),
        }
    }
}

fn index(value: usize) -> JsValue {
    JsValue::from(u32::try_from(value).unwrap_or(u32::MAX))
}

impl GridWidget for JsGridWidget {
    type HeaderTarget = Element;

    fn apply_columns(&mut self, columns: &[ColumnDefinition]) {
        self.push_columns("setColumns", columns);
    }

    fn update_column_classes(&mut self, columns: &[ColumnDefinition]) {
        self.push_columns("updateColumnClasses", columns);
    }

    fn invalidate(&mut self) {
        self.call("invalidate", &[]);
    }

    fn invalidate_rows(&mut self, rows: &[usize]) {
        let rows: Array = rows.iter().map(|&r| index(r)).collect();
        self.call("invalidateRows", &[rows.into()]);
    }

    fn update_row_count(&mut self) {
        self.call("updateRowCount", &[]);
    }

    fn render(&mut self) {
        self.call("render", &[]);
    }

    fn resize_canvas(&mut self) {
        self.call("resizeCanvas", &[]);
    }

    fn scroll_row_to_top(&mut self, row: usize) {
        self.call("scrollRowToTop", &[index(row)]);
    }

    fn column_ids(&self) -> Vec<String> {
        self.query::<Vec<IdOnly>>("getColumns", &[])
            .map(|columns| columns.into_iter().map(|c| c.id).collect())
            .unwrap_or_default()
    }

    fn visible_row_range(&self) -> RowRange {
        #[derive(Deserialize)]
        struct Range {
            top: usize,
            bottom: usize,
        }
        self.query::<Range>("getViewport", &[])
            .map(|r| RowRange {
                top: r.top,
                bottom: r.bottom,
            })
            .unwrap_or_default()
    }

    fn scroll_cell_into_view(&mut self, row: usize, cell: usize) {
        self.call("scrollCellIntoView", &[index(row), index(cell)]);
    }

    fn set_active_cell(&mut self, row: usize, cell: usize) {
        self.call("setActiveCell", &[index(row), index(cell)]);
    }

    fn cell_box(&self, row: usize, cell: usize) -> Option<CellBox> {
        let node: NodeBox = self.query("getCellNodeBox", &[index(row), index(cell)])?;
        Some(CellBox {
            width: node.right - node.left,
            height: node.bottom - node.top,
        })
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent<Element>> {
        self.queue.drain()
    }
}
