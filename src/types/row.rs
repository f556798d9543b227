use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::column::{ColumnMetadata, DiffKind, INDEX_ID};

/// Record key of the row-level preview marker.
pub const ROW_DIFF_KEY: &str = "__tdpRowDiff";
/// Record key of the per-cell preview markers (object: column id -> marker).
pub const CELL_DIFF_KEY: &str = "__tdpDiff";

/// One record of a data page, keyed by column id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Row identity (`tdpId`).
    pub fn tdp_id(&self) -> Option<u64> {
        self.0.get(INDEX_ID).and_then(Value::as_u64)
    }

    pub fn value(&self, column_id: &str) -> Option<&Value> {
        self.0.get(column_id)
    }

    /// Display text of a cell; missing cells display as empty.
    pub fn display_value(&self, column_id: &str) -> String {
        self.0.get(column_id).map(display_value).unwrap_or_default()
    }

    /// Row-level preview marker, if any.
    pub fn row_diff(&self) -> Option<DiffKind> {
        self.0
            .get(ROW_DIFF_KEY)
            .and_then(Value::as_str)
            .and_then(DiffKind::parse)
    }

    /// Cell-level preview marker for `column_id`, if any.
    pub fn cell_diff(&self, column_id: &str) -> Option<DiffKind> {
        self.0
            .get(CELL_DIFF_KEY)
            .and_then(Value::as_object)
            .and_then(|cells| cells.get(column_id))
            .and_then(Value::as_str)
            .and_then(DiffKind::parse)
    }
}

/// Formats a JSON value for display in a grid cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Metadata part of a data page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

/// A data page as delivered by the data-fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPage {
    pub metadata: PageMetadata,
    #[serde(default)]
    pub records: Vec<Row>,
    #[serde(default, alias = "isPreview")]
    pub preview: bool,
}

impl DataPage {
    pub fn new(columns: Vec<ColumnMetadata>, records: Vec<Row>) -> Self {
        Self {
            metadata: PageMetadata { columns },
            records,
            preview: false,
        }
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.metadata.columns
    }
}
