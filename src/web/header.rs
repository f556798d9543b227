//! Live DOM header widgets.

use web_sys::{Document, Element};

use crate::columns::column_diff_class;
use crate::error::{GridError, Result};
use crate::headers::{HeaderFactory, HeaderHandle};
use crate::types::{ColumnMetadata, INDEX_ID};

/// Header of one column: name and type label, rebound on reuse.
pub struct DomHeader {
    column_id: String,
    root: Element,
    title: Option<Element>,
    kind: Option<Element>,
}

impl DomHeader {
    fn bind_metadata(&mut self, metadata: &ColumnMetadata) {
        self.column_id.clone_from(&metadata.id);
        if let Some(title) = &self.title {
            title.set_text_content(Some(&metadata.name));
        }
        if let Some(kind) = &self.kind {
            kind.set_text_content(Some(metadata.simplified_type().label()));
        }
        let diff = column_diff_class(metadata.diff);
        if diff.is_empty() {
            self.root.set_class_name("grid-header");
        } else {
            self.root.set_class_name(&format!("grid-header {diff}"));
        }
    }
}

impl HeaderHandle for DomHeader {
    type Target = Element;

    fn bind(&mut self, metadata: Option<&ColumnMetadata>) {
        if let Some(metadata) = metadata {
            self.bind_metadata(metadata);
        }
    }

    fn attach(&mut self, target: &Element) -> Result<()> {
        if !target.is_connected() {
            return Err(GridError::RenderTargetMissing {
                column_id: self.column_id.clone(),
            });
        }
        target
            .append_child(&self.root)
            .map(|_| ())
            .map_err(|e| GridError::Js(format!("{e:?}")))
    }

    fn detach(&mut self) {
        self.root.remove();
    }

    fn dispose(self) {
        self.root.remove();
    }
}

/// Builds [`DomHeader`]s in one document.
pub struct DomHeaderFactory {
    document: Document,
}

impl DomHeaderFactory {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, class: &str) -> Result<Element> {
        let element = self
            .document
            .create_element("div")
            .map_err(|e| GridError::Js(format!("{e:?}")))?;
        element.set_class_name(class);
        Ok(element)
    }
}

impl HeaderFactory for DomHeaderFactory {
    type Handle = DomHeader;

    fn create_column_header(&mut self, metadata: &ColumnMetadata) -> Result<DomHeader> {
        let root = self.element("grid-header")?;
        let title = self.element("grid-header-title")?;
        let kind = self.element("grid-header-type")?;
        root.append_child(&title)
            .and_then(|_| root.append_child(&kind))
            .map_err(|e| GridError::Js(format!("{e:?}")))?;
        let mut header = DomHeader {
            column_id: metadata.id.clone(),
            root,
            title: Some(title),
            kind: Some(kind),
        };
        header.bind_metadata(metadata);
        Ok(header)
    }

    fn create_index_header(&mut self) -> Result<DomHeader> {
        Ok(DomHeader {
            column_id: INDEX_ID.to_string(),
            root: self.element("grid-header index-header")?,
            title: None,
            kind: None,
        })
    }
}
