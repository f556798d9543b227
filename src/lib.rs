//! gridsync - rendering synchronization for a virtualized data grid
//!
//! Keeps a virtualized grid widget consistent with the data page it shows:
//! - Column definitions rebuilt per data page, with drag-reorder detection
//! - Pooled header widgets that survive column regenerations
//! - Column and line selection that follows visual order
//! - Cell decoration: preview diffs, invalid values, highlight, hidden chars
//! - Debounced, cancellable recomputation on a single thread
//! - Truncation-aware cell tooltips
//!
//! The core is host-independent and tested natively; the `web` module wires
//! it to a JS grid and the DOM when compiled for `wasm32`.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridsync';
//! await init();
//! const view = new GridView(gridAdapter, measureCanvas, { highlightDelayMs: 150 });
//! view.onEvent((event) => console.log(event.type, event));
//! view.load(page, 'dataset-42');
//! ```

pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod headers;
pub mod rows;
pub mod schedule;
pub mod selection;
pub mod style;
pub mod tooltip;
pub mod types;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use engine::{GridEngine, GridTask};
pub use error::{GridError, Result};
pub use events::{EventBus, GridEvent};
#[cfg(target_arch = "wasm32")]
pub use web::GridView;

pub use types::*;

/// Build the column definitions of a data page's column metadata.
///
/// # Errors
/// Returns an error if `columns` is not an array of column metadata.
#[wasm_bindgen(js_name = createColumns)]
pub fn create_columns_js(columns: JsValue, is_preview: bool) -> std::result::Result<JsValue, JsValue> {
    let metadata: Vec<ColumnMetadata> =
        serde_wasm_bindgen::from_value(columns).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let definitions = columns::create_columns(&metadata, is_preview, None);
    serde_wasm_bindgen::to_value(&definitions)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Positions `{ from, to }` of the single column moved between two id
/// orderings, or `undefined`.
///
/// # Errors
/// Returns an error if the result cannot be converted to a JS value.
#[allow(clippy::needless_pass_by_value)]
#[wasm_bindgen(js_name = detectMove)]
pub fn detect_move_js(
    previous: Vec<String>,
    current: Vec<String>,
) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&columns::detect_move(&previous, &current))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
