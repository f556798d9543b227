//! Row store contract and an in-memory implementation.
//!
//! Rows come from the data-fetch layer. The store presents the *filtered*
//! view: `row(i)` is the i-th row that passes every active predicate, which
//! is also the row index the grid widget uses.

use std::fmt;
use std::rc::Rc;

use crate::types::Row;

/// A caller-supplied row filter. Must be side-effect free.
pub trait FilterPredicate {
    fn matches(&self, row: &Row) -> bool;
}

impl<F> FilterPredicate for F
where
    F: Fn(&Row) -> bool,
{
    fn matches(&self, row: &Row) -> bool {
        self(row)
    }
}

/// Predicates composed with logical AND. An empty set matches every row.
#[derive(Clone, Default)]
pub struct FilterSet {
    predicates: Vec<Rc<dyn FilterPredicate>>,
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, predicate: impl FilterPredicate + 'static) -> Self {
        self.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: impl FilterPredicate + 'static) {
        self.predicates.push(Rc::new(predicate));
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl FilterPredicate for FilterSet {
    fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }
}

/// What a store mutation changed, for the viewport to re-render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStoreChange {
    pub row_count_changed: bool,
    /// Filtered indices whose row content changed.
    pub changed_rows: Vec<usize>,
}

impl RowStoreChange {
    pub fn is_empty(&self) -> bool {
        !self.row_count_changed && self.changed_rows.is_empty()
    }
}

/// Mutable, filterable row store backing the grid.
pub trait RowStore {
    /// Replace every record (data-page swap).
    fn set_records(&mut self, records: Vec<Row>) -> RowStoreChange;

    /// Replace the active predicates.
    fn set_filter(&mut self, filters: FilterSet) -> RowStoreChange;

    /// Number of rows passing the filter.
    fn row_count(&self) -> usize;

    /// The `index`-th filtered row.
    fn row(&self, index: usize) -> Option<&Row>;

    /// Filtered rows in display order.
    fn rows(&self) -> Box<dyn Iterator<Item = &Row> + '_> {
        Box::new((0..self.row_count()).filter_map(move |i| self.row(i)))
    }
}

/// Reference [`RowStore`] keeping all records in memory.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    records: Vec<Row>,
    filters: FilterSet,
    /// Record indices passing the filter, in record order.
    visible: Vec<usize>,
}

impl MemoryRowStore {
    pub fn new(records: Vec<Row>) -> Self {
        let mut store = Self::default();
        store.set_records(records);
        store
    }

    fn refresh(&mut self) -> RowStoreChange {
        let next: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(i, row)| self.filters.matches(row).then_some(i))
            .collect();
        let len = next.len().max(self.visible.len());
        let changed_rows = (0..len)
            .filter(|&i| next.get(i) != self.visible.get(i))
            .collect();
        let row_count_changed = next.len() != self.visible.len();
        self.visible = next;
        RowStoreChange {
            row_count_changed,
            changed_rows,
        }
    }
}

impl RowStore for MemoryRowStore {
    fn set_records(&mut self, records: Vec<Row>) -> RowStoreChange {
        self.records = records;
        // Every position may hold new content after a swap.
        self.visible.clear();
        self.refresh()
    }

    fn set_filter(&mut self, filters: FilterSet) -> RowStoreChange {
        self.filters = filters;
        self.refresh()
    }

    fn row_count(&self) -> usize {
        self.visible.len()
    }

    fn row(&self, index: usize) -> Option<&Row> {
        self.visible
            .get(index)
            .and_then(|&record| self.records.get(record))
    }
}
