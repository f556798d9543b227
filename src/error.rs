//! Structured error types for gridsync.
//!
//! Stale selections and malformed reorders are recovered where they happen and
//! never reach this type; what remains are programming errors and failures at
//! the host boundary.

/// All errors that can occur while synchronizing the grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A header widget could not be attached because its render target is gone.
    ///
    /// This means the header pool and the grid widget disagree about which
    /// header cells exist, which is pool corruption rather than a runtime
    /// condition.
    #[error("Render target missing for header of column {column_id}")]
    RenderTargetMissing { column_id: String },

    /// A column id that is not part of the current column set.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A row index outside the filtered row set.
    #[error("Row {index} out of range (row count {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure reported by the JavaScript side.
    #[error("JS error: {0}")]
    Js(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
