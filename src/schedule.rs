//! Cancellable deferred work.
//!
//! Everything the controller postpones (focus transfer, debounced refresh,
//! post-render sizing) goes through a [`Scheduler`]. Nothing runs on its own:
//! the host drains due tasks from its event loop, so deferred work always sees
//! the state as of the end of the handler that scheduled it.
//!
//! Time comes from a [`Clock`] so tests can use a [`ManualClock`] and advance it
//! explicitly instead of sleeping.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for the scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when [`advance`](ManualClock::advance) is called.
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    anchor: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            anchor: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.anchor + self.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Pending<T> {
    id: TimerId,
    due: Instant,
    task: T,
}

pub struct Scheduler<T> {
    clock: Arc<dyn Clock>,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<T> Scheduler<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Scheduler {
            clock,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Queue `task` to become due `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.clock.now() + delay;
        self.pending.push(Pending { id, due, task });
        id
    }

    /// Drop a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every task that is due, ordered by due time then by
    /// scheduling order.
    pub fn take_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
