use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};

/// Id of the reserved index column, always first in a column set.
///
/// It doubles as the row identity key in records.
pub const INDEX_ID: &str = "tdpId";

/// Pending-change marker carried by preview rows, cells and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    New,
    #[serde(alias = "update")]
    Updated,
    #[serde(alias = "delete")]
    Deleted,
}

impl DiffKind {
    /// Parse a marker value. Unknown markers are treated as "no marker".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "updated" | "update" => Some(Self::Updated),
            "deleted" | "delete" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Coarse type category derived from a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimplifiedType {
    Integer,
    Decimal,
    Boolean,
    Date,
    Text,
    #[default]
    Unknown,
}

impl SimplifiedType {
    /// Map a declared (backend) type name onto its simplified category.
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" | "short" | "byte" => Self::Integer,
            "double" | "float" | "decimal" | "numeric" | "number" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "date" | "datetime" | "localdate" | "timestamp" => Self::Date,
            "string" | "char" | "text" => Self::Text,
            _ => Self::Unknown,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    /// Short label shown in column headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Data-quality summary of a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnQuality {
    pub valid: u64,
    pub empty: u64,
    pub invalid: u64,
    /// Display values flagged invalid for this column's current type/domain.
    pub invalid_values: Vec<String>,
}

impl ColumnQuality {
    pub fn is_invalid(&self, value: &str) -> bool {
        self.invalid_values.iter().any(|v| v == value)
    }
}

/// Column metadata as delivered by the data-fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub declared_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub quality: ColumnQuality,
    /// Preview marker for the whole column.
    #[serde(
        rename = "__tdpColumnDiff",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub diff: Option<DiffKind>,
}

impl ColumnMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, declared_type: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            declared_type: declared_type.to_string(),
            ..Self::default()
        }
    }

    pub fn simplified_type(&self) -> SimplifiedType {
        SimplifiedType::from_declared(&self.declared_type)
    }
}

/// Header content of a column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderContent {
    /// Left empty; a live header widget from the header pool fills it.
    Deferred,
    /// Fully rendered static markup (preview columns and custom index labels).
    Static(String),
}

impl Serialize for HeaderContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Deferred => serializer.serialize_str(""),
            Self::Static(html) => serializer.serialize_str(html),
        }
    }
}

/// Which cell renderer a column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormatter {
    /// Renders the row's identity.
    Index,
    /// Renders the column value with styling and preview markers.
    Value,
}

/// One viewport column, in the shape the virtualized grid consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    #[serde(rename = "field")]
    pub field_key: String,
    #[serde(rename = "name")]
    pub header: HeaderContent,
    #[serde(skip)]
    pub formatter: CellFormatter,
    /// Source metadata; `None` for the index column.
    #[serde(skip)]
    pub metadata: Option<Rc<ColumnMetadata>>,
    pub min_width: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    pub resizable: bool,
    /// Whether the grid lets the user drag this column elsewhere.
    pub reorderable: bool,
    pub selectable: bool,
    #[serde(rename = "preview")]
    pub is_preview: bool,
}

impl ColumnDefinition {
    pub fn is_index(&self) -> bool {
        self.id == INDEX_ID
    }

    pub fn simplified_type(&self) -> SimplifiedType {
        self.metadata
            .as_deref()
            .map(ColumnMetadata::simplified_type)
            .unwrap_or_default()
    }

    /// Display name of the column (empty for the index column).
    pub fn name(&self) -> &str {
        self.metadata.as_deref().map_or("", |m| m.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplified_type_mapping() {
        assert_eq!(SimplifiedType::from_declared("INTEGER"), SimplifiedType::Integer);
        assert_eq!(SimplifiedType::from_declared("double"), SimplifiedType::Decimal);
        assert_eq!(SimplifiedType::from_declared(" string "), SimplifiedType::Text);
        assert_eq!(SimplifiedType::from_declared("geo"), SimplifiedType::Unknown);
        assert!(SimplifiedType::Decimal.is_numeric());
        assert!(!SimplifiedType::Unknown.is_numeric());
    }

    #[test]
    fn test_diff_kind_aliases() {
        assert_eq!(DiffKind::parse("update"), Some(DiffKind::Updated));
        assert_eq!(DiffKind::parse("delete"), Some(DiffKind::Deleted));
        assert_eq!(DiffKind::parse("renamed"), None);
    }

    #[test]
    fn test_metadata_deserializes_rest_shape() {
        let json = r#"{
            "id": "0001",
            "name": "city",
            "type": "string",
            "quality": { "valid": 2, "empty": 0, "invalid": 1, "invalidValues": ["??"] },
            "__tdpColumnDiff": "new"
        }"#;
        let meta: ColumnMetadata = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(meta.id, "0001");
        assert_eq!(meta.diff, Some(DiffKind::New));
        assert!(meta.quality.is_invalid("??"));
        assert_eq!(meta.simplified_type(), SimplifiedType::Text);
    }
}
