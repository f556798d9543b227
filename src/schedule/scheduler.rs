//! Keyed debouncing of deferred work.
//!
//! At most one task is pending per key: scheduling under a key replaces the
//! pending task and restarts its delay, so a burst collapses into a single
//! execution of the last submitted work. The scheduler never runs anything by
//! itself; the host asks for due tasks with [`UpdateScheduler::take_due`] and
//! runs them one at a time, which keeps different keys interleaved but never
//! nested.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::clock::Clock;

/// Identifies an independent concern; tasks under different keys never
/// cancel each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey(Cow<'static, str>);

impl TaskKey {
    pub const COLUMNS: Self = Self(Cow::Borrowed("columns"));
    pub const STYLES: Self = Self(Cow::Borrowed("styles"));
    pub const HIGHLIGHT: Self = Self(Cow::Borrowed("highlight"));
    pub const PANEL: Self = Self(Cow::Borrowed("panel"));
    pub const RESIZE: Self = Self(Cow::Borrowed("resize"));
    pub const TOOLTIP_SHOW: Self = Self(Cow::Borrowed("tooltip.show"));
    pub const TOOLTIP_CONTENT: Self = Self(Cow::Borrowed("tooltip.content"));
    pub const TOOLTIP_HIDE: Self = Self(Cow::Borrowed("tooltip.hide"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cancel token for one scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    key: TaskKey,
    seq: u64,
}

impl TaskHandle {
    pub fn key(&self) -> &TaskKey {
        &self.key
    }
}

struct PendingTask<W> {
    seq: u64,
    scheduled_at: f64,
    run_at: f64,
    work: W,
}

/// A task whose delay elapsed, handed to the host for execution.
#[derive(Debug)]
pub struct ReadyTask<W> {
    pub key: TaskKey,
    pub scheduled_at: f64,
    pub run_at: f64,
    pub work: W,
}

/// Debounces work per [`TaskKey`].
pub struct UpdateScheduler<W> {
    clock: Rc<dyn Clock>,
    pending: HashMap<TaskKey, PendingTask<W>>,
    next_seq: u64,
    closed: bool,
}

impl<W> fmt::Debug for UpdateScheduler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateScheduler")
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<W> UpdateScheduler<W> {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: HashMap::new(),
            next_seq: 0,
            closed: false,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Schedule `work` to run `delay_ms` from now, replacing any pending task
    /// under the same key.
    ///
    /// After [`shutdown`](Self::shutdown) the work is dropped immediately.
    pub fn schedule(&mut self, key: impl Into<TaskKey>, delay_ms: f64, work: W) -> TaskHandle {
        let key = key.into();
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TaskHandle {
            key: key.clone(),
            seq,
        };
        if self.closed {
            tracing::debug!("Scheduler shut down, dropping task {}", key);
            return handle;
        }

        let now = self.clock.now_ms();
        let task = PendingTask {
            seq,
            scheduled_at: now,
            run_at: now + delay_ms.max(0.0),
            work,
        };
        if self.pending.insert(key.clone(), task).is_some() {
            tracing::trace!("Task {} superseded", key);
        }
        handle
    }

    /// Cancel whatever is pending under `key`.
    pub fn cancel(&mut self, key: &TaskKey) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Cancel the task behind `handle`, unless it was already superseded or run.
    pub fn cancel_handle(&mut self, handle: &TaskHandle) -> bool {
        let current = self
            .pending
            .get(&handle.key)
            .is_some_and(|task| task.seq == handle.seq);
        if current {
            self.pending.remove(&handle.key);
        }
        current
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Cancel everything and refuse all later work (view teardown).
    pub fn shutdown(&mut self) {
        self.cancel_all();
        self.closed = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed
    }

    pub fn is_pending(&self, key: &TaskKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest time at which a pending task becomes due.
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending
            .values()
            .map(|task| task.run_at)
            .min_by(f64::total_cmp)
    }

    /// Remove and return every task that is due, in deadline then
    /// submission order.
    pub fn take_due(&mut self) -> Vec<ReadyTask<W>> {
        let now = self.clock.now_ms();
        let due: Vec<TaskKey> = self
            .pending
            .iter()
            .filter(|(_, task)| task.run_at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        let mut ready: Vec<(u64, ReadyTask<W>)> = due
            .into_iter()
            .filter_map(|key| {
                let task = self.pending.remove(&key)?;
                Some((
                    task.seq,
                    ReadyTask {
                        key,
                        scheduled_at: task.scheduled_at,
                        run_at: task.run_at,
                        work: task.work,
                    },
                ))
            })
            .collect();
        ready.sort_by(|(a_seq, a), (b_seq, b)| {
            a.run_at.total_cmp(&b.run_at).then(a_seq.cmp(b_seq))
        });
        ready.into_iter().map(|(_, task)| task).collect()
    }
}

impl<W: FnOnce()> UpdateScheduler<W> {
    /// Run every due closure. Returns how many ran.
    pub fn run_due(&mut self) -> usize {
        let ready = self.take_due();
        let count = ready.len();
        for task in ready {
            (task.work)();
        }
        count
    }
}
