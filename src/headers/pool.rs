use std::collections::HashMap;

use super::{HeaderFactory, HeaderHandle};
use crate::error::Result;
use crate::types::{ColumnMetadata, INDEX_ID};

/// Lifecycle state of a pooled header widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// Rendered in the grid.
    Attached,
    /// Detached but alive, waiting to be reused.
    Pooled,
    /// Scope and DOM released.
    Destroyed,
}

/// What a render request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
    Created,
    Reused,
    /// Preview columns have no live header.
    Skipped,
}

/// A header render request from the grid widget.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRequest<'a> {
    pub column_id: &'a str,
    /// `None` when the grid asks for a header the column set has no metadata
    /// for; routed to the index header.
    pub metadata: Option<&'a ColumnMetadata>,
    pub is_preview: bool,
}

/// A header widget bound to one column.
#[derive(Debug)]
pub struct HeaderWidget<H> {
    pub column_id: String,
    pub handle: H,
}

/// Pool of header widgets keyed by column id.
///
/// A column id has at most one live widget, attached or pooled.
pub struct HeaderPool<F: HeaderFactory> {
    factory: F,
    attached: HashMap<String, HeaderWidget<F::Handle>>,
    pooled: HashMap<String, HeaderWidget<F::Handle>>,
    renew_all: bool,
}

impl<F: HeaderFactory> HeaderPool<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            attached: HashMap::new(),
            pooled: HashMap::new(),
            renew_all: false,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn renew_all(&self) -> bool {
        self.renew_all
    }

    /// Force the next destroy requests to dispose instead of pooling.
    ///
    /// Turning it on also disposes everything currently pooled, since those
    /// widgets belong to a data page that is being replaced.
    pub fn set_renew_all(&mut self, renew_all: bool) {
        self.renew_all = renew_all;
        if renew_all {
            let flushed = self.pooled.len();
            for (_, widget) in self.pooled.drain() {
                widget.handle.dispose();
            }
            if flushed > 0 {
                tracing::debug!("Disposed {} pooled headers", flushed);
            }
        }
    }

    /// The grid is about to drop the header cell of `column_id`.
    ///
    /// Returns the widget's new state, or `None` if no widget was attached.
    pub fn on_header_destroy_requested(&mut self, column_id: &str) -> Option<HeaderState> {
        let mut widget = self.attached.remove(column_id)?;
        if self.renew_all {
            widget.handle.dispose();
            tracing::trace!("Header {} destroyed", column_id);
            Some(HeaderState::Destroyed)
        } else {
            widget.handle.detach();
            // A stale pooled twin cannot exist while this one was attached,
            // but never keep two widgets for one id.
            if let Some(stale) = self.pooled.insert(column_id.to_string(), widget) {
                stale.handle.dispose();
            }
            tracing::trace!("Header {} pooled", column_id);
            Some(HeaderState::Pooled)
        }
    }

    /// The grid rendered the header cell of a column into `target`.
    ///
    /// # Errors
    /// Propagates a construction failure, or the attach failure when `target`
    /// is gone. The widget is disposed in the latter case, so the pool stays
    /// consistent.
    pub fn on_header_render_requested(
        &mut self,
        request: HeaderRequest<'_>,
        target: &<F::Handle as HeaderHandle>::Target,
    ) -> Result<HeaderOutcome> {
        if request.is_preview {
            return Ok(HeaderOutcome::Skipped);
        }
        let id = request.column_id;

        let (mut widget, outcome) = if let Some(mut widget) = self.attached.remove(id) {
            // Rendered again without a destroy in between: move it.
            widget.handle.detach();
            (widget, HeaderOutcome::Reused)
        } else if let Some(widget) = self.pooled.remove(id) {
            (widget, HeaderOutcome::Reused)
        } else {
            let handle = match request.metadata {
                Some(metadata) if id != INDEX_ID => self.factory.create_column_header(metadata)?,
                _ => self.factory.create_index_header()?,
            };
            let widget = HeaderWidget {
                column_id: id.to_string(),
                handle,
            };
            (widget, HeaderOutcome::Created)
        };

        widget.handle.bind(request.metadata);
        if let Err(e) = widget.handle.attach(target) {
            tracing::warn!("Header {} could not be attached: {}", id, e);
            widget.handle.dispose();
            return Err(e);
        }
        self.attached.insert(id.to_string(), widget);
        Ok(outcome)
    }

    pub fn state_of(&self, column_id: &str) -> Option<HeaderState> {
        if self.attached.contains_key(column_id) {
            Some(HeaderState::Attached)
        } else if self.pooled.contains_key(column_id) {
            Some(HeaderState::Pooled)
        } else {
            None
        }
    }

    pub fn is_live(&self, column_id: &str) -> bool {
        self.state_of(column_id).is_some()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pooled.len()
    }

    /// Dispose every widget (view teardown).
    pub fn teardown(&mut self) {
        for (_, widget) in self.attached.drain().chain(self.pooled.drain()) {
            widget.handle.dispose();
        }
    }
}
