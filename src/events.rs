//! Typed notifications from the engine to the application.
//!
//! Dispatch is synchronous and in emission order: every subscriber sees
//! event N before any subscriber sees event N+1, and nothing else runs in
//! between.

use serde::Serialize;

use crate::columns::MovedColumn;
use crate::tooltip::TooltipState;
use crate::viewport::RowRange;

/// Something the application may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GridEvent {
    /// A new data page was loaded. Columns are rebuilt right after.
    #[serde(rename_all = "camelCase")]
    DataPageReplaced {
        column_count: usize,
        row_count: usize,
        preview: bool,
    },
    /// The column set pushed into the grid changed.
    #[serde(rename_all = "camelCase")]
    ColumnsChanged { column_ids: Vec<String> },
    /// Selected columns (visual order) or selected line changed.
    #[serde(rename_all = "camelCase")]
    SelectionChanged {
        column_ids: Vec<String>,
        line: Option<usize>,
    },
    /// A single column was dragged to a new position.
    ReorderDetected(MovedColumn),
    /// Rows on screen after scrolling settled.
    RangeVisibleChanged(RowRange),
    /// Right click on a header; the application opens its column menu.
    #[serde(rename_all = "camelCase")]
    HeaderMenuRequested { column_id: String },
    #[serde(rename_all = "camelCase")]
    ColumnResized { column_id: String, width: f32 },
    TooltipChanged(TooltipState),
}

/// Token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Observer list for [`GridEvent`]s.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener, in subscription order.
    pub fn emit(&mut self, event: &GridEvent) {
        tracing::trace!("Emitting {:?}", event);
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |_| log.borrow_mut().push(name));
        }
        bus.emit(&GridEvent::RangeVisibleChanged(RowRange { top: 0, bottom: 9 }));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&GridEvent::ColumnsChanged { column_ids: vec![] });
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let event = GridEvent::SelectionChanged {
            column_ids: vec!["0001".into()],
            line: Some(3),
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "selectionChanged");
        assert_eq!(json["columnIds"][0], "0001");
        assert_eq!(json["line"], 3);
    }
}
