//! Browser binding: the `GridView` export and the DOM/JS implementations of
//! the engine's seams.

mod header;
mod measure;
mod storage;
mod timer;
mod view;
mod widget;

pub use header::{DomHeader, DomHeaderFactory};
pub use measure::CanvasTextMeasurer;
pub use storage::LocalStorageWidthStore;
pub use timer::TimerDriver;
pub use view::GridView;
pub use widget::{EventQueue, JsGridWidget};

use crate::schedule::Clock;

pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// `performance.now()` as a scheduler clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        now_ms()
    }
}
