//! Column definitions from page metadata.

use std::rc::Rc;

use crate::config::GridConfig;
use crate::style::escape_html;
use crate::types::{
    CellFormatter, ColumnDefinition, ColumnMetadata, DiffKind, HeaderContent, INDEX_ID,
};

/// Builds viewport column definitions.
///
/// The output is the single source of truth for "current columns" until the
/// next call; it preserves metadata order behind a leading index column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBuilder {
    /// Fixed max width of the index column.
    pub index_max_width: f32,
    /// Minimum width of every data column.
    pub min_width: f32,
}

impl Default for ColumnBuilder {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

impl ColumnBuilder {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            index_max_width: config.index_column_max_width,
            min_width: config.column_min_width,
        }
    }

    /// Create the column set for `metadata`.
    ///
    /// In preview mode every header is a static label carrying the column
    /// diff class; otherwise data headers are deferred to the header pool.
    pub fn create_columns(
        &self,
        metadata: &[ColumnMetadata],
        is_preview: bool,
        index_header_template: Option<&str>,
    ) -> Vec<ColumnDefinition> {
        let mut columns = Vec::with_capacity(metadata.len() + 1);
        columns.push(self.index_column(is_preview, index_header_template));
        columns.extend(metadata.iter().map(|meta| self.data_column(meta, is_preview)));
        columns
    }

    fn index_column(&self, is_preview: bool, template: Option<&str>) -> ColumnDefinition {
        let header = match template {
            Some(html) => HeaderContent::Static(html.to_string()),
            None if is_preview => HeaderContent::Static(String::new()),
            None => HeaderContent::Deferred,
        };
        ColumnDefinition {
            id: INDEX_ID.to_string(),
            field_key: INDEX_ID.to_string(),
            header,
            formatter: CellFormatter::Index,
            metadata: None,
            min_width: self.index_max_width.min(self.min_width),
            max_width: Some(self.index_max_width),
            width: None,
            css_class: None,
            resizable: false,
            reorderable: false,
            selectable: false,
            is_preview,
        }
    }

    fn data_column(&self, meta: &ColumnMetadata, is_preview: bool) -> ColumnDefinition {
        let header = if is_preview {
            HeaderContent::Static(preview_header(meta))
        } else {
            HeaderContent::Deferred
        };
        ColumnDefinition {
            id: meta.id.clone(),
            field_key: meta.id.clone(),
            header,
            formatter: CellFormatter::Value,
            metadata: Some(Rc::new(meta.clone())),
            min_width: self.min_width,
            max_width: None,
            width: None,
            css_class: None,
            resizable: true,
            reorderable: true,
            selectable: true,
            is_preview,
        }
    }
}

/// Shorthand for [`ColumnBuilder::create_columns`] with default widths.
pub fn create_columns(
    metadata: &[ColumnMetadata],
    is_preview: bool,
    index_header_template: Option<&str>,
) -> Vec<ColumnDefinition> {
    ColumnBuilder::default().create_columns(metadata, is_preview, index_header_template)
}

/// CSS class of a column header in preview mode.
pub fn column_diff_class(diff: Option<DiffKind>) -> &'static str {
    match diff {
        Some(DiffKind::New) => "newColumn",
        Some(DiffKind::Updated) => "updatedColumn",
        Some(DiffKind::Deleted) => "deletedColumn",
        None => "",
    }
}

/// Static header label for a preview column.
fn preview_header(meta: &ColumnMetadata) -> String {
    let diff_class = column_diff_class(meta.diff);
    let class = if diff_class.is_empty() {
        "grid-header".to_string()
    } else {
        format!("grid-header {diff_class}")
    };
    format!(
        r#"<div class="{class}"><div class="grid-header-title">{}</div><div class="grid-header-type">{}</div></div>"#,
        escape_html(&meta.name),
        meta.simplified_type().label(),
    )
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unreachable, clippy::float_cmp)]
mod tests {
    use super::*;

    fn metadata() -> Vec<ColumnMetadata> {
        vec![
            ColumnMetadata::new("0000", "id", "integer"),
            ColumnMetadata::new("0001", "city", "string"),
        ]
    }

    #[test]
    fn test_index_column_first() {
        let columns = create_columns(&metadata(), false, None);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].id, INDEX_ID);
        assert!(!columns[0].resizable);
        assert!(!columns[0].selectable);
        assert!(!columns[0].reorderable);
        assert_eq!(columns[0].max_width, Some(45.0));
        assert_eq!(columns[0].formatter, CellFormatter::Index);
    }

    #[test]
    fn test_normal_headers_are_deferred() {
        let columns = create_columns(&metadata(), false, None);
        assert!(columns.iter().all(|c| c.header == HeaderContent::Deferred));
        assert!(columns
            .iter()
            .skip(1)
            .all(|c| c.resizable && c.reorderable && c.selectable));
    }

    #[test]
    fn test_preview_headers_are_static() {
        let mut meta = metadata();
        meta[1].diff = Some(DiffKind::Updated);
        meta[1].name = "<b>city</b>".to_string();
        let columns = create_columns(&meta, true, None);

        let HeaderContent::Static(html) = &columns[2].header else {
            unreachable!("preview header must be static");
        };
        assert!(html.contains("grid-header updatedColumn"));
        assert!(html.contains("&lt;b&gt;city&lt;/b&gt;"));
        assert!(html.contains(">text<"));
        assert!(columns.iter().all(|c| c.is_preview));
    }

    #[test]
    fn test_index_template_used() {
        let columns = create_columns(&metadata(), false, Some("<span>#</span>"));
        assert_eq!(
            columns[0].header,
            HeaderContent::Static("<span>#</span>".to_string())
        );
    }
}
