//! Header widgets and their pool.
//!
//! A header widget is expensive to build (it owns a compiled template and a
//! reactive scope in the UI layer), so widgets are kept per column id across
//! column-set regenerations and reused when the same id is rendered again.
//! The widget itself is opaque to the pool: any UI layer can provide one by
//! implementing [`HeaderHandle`] and [`HeaderFactory`].

mod pool;

pub use pool::{HeaderOutcome, HeaderPool, HeaderRequest, HeaderState, HeaderWidget};

use crate::error::Result;
use crate::types::ColumnMetadata;

/// A live header widget owned by the pool.
pub trait HeaderHandle {
    /// DOM location (or equivalent) the widget is inserted into.
    type Target;

    /// Bind the widget to fresh column metadata. `None` for the index header.
    fn bind(&mut self, metadata: Option<&ColumnMetadata>);

    /// Insert the widget under `target`.
    ///
    /// # Errors
    /// [`GridError::RenderTargetMissing`](crate::error::GridError::RenderTargetMissing)
    /// when the target no longer exists.
    fn attach(&mut self, target: &Self::Target) -> Result<()>;

    /// Remove the widget from its location, keeping it alive.
    fn detach(&mut self);

    /// Release the widget's scope and DOM for good.
    fn dispose(self);
}

/// Builds header widgets on demand.
///
/// Construction fails only when the UI layer cannot create elements at all.
pub trait HeaderFactory {
    type Handle: HeaderHandle;

    fn create_column_header(&mut self, metadata: &ColumnMetadata) -> Result<Self::Handle>;

    fn create_index_header(&mut self) -> Result<Self::Handle>;
}
