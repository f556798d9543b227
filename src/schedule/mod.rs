//! Debounced, cancellable deferred work on a single thread.

mod clock;
mod scheduler;

pub use clock::{Clock, ManualClock};
pub use scheduler::{ReadyTask, TaskHandle, TaskKey, UpdateScheduler};
