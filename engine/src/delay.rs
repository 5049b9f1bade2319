//! Delay service: run a callback once, after at least a given duration, on the
//! execution context that scheduled it.
//!
//! Two implementations:
//! - [`ManualDelay`] keeps a virtual clock that only moves when [`ManualDelay::advance`]
//!   is called. Deterministic; used by tests and frame-stepped rendering.
//! - [`LocalDelay`] spawns onto a shared tokio [`LocalSet`], so callbacks run on
//!   whichever thread drives that set.
//!
//! Neither supports cancellation or repetition.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tally_core::Deferred;
use tokio::task::LocalSet;
use tokio::time;

pub type DelayedCallback = Box<dyn FnOnce()>;

pub trait Delay {
    /// Run `callback` once after at least `after` has elapsed.
    fn schedule_after(&self, after: Duration, callback: DelayedCallback);

    /// Fire `deferred`'s resolution pass after `after`.
    fn resolve_after(&self, after: Duration, deferred: &Deferred) {
        self.schedule_after(after, Box::new(deferred.resolve().into_callback()));
    }
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_seq: u64,
    // Keyed by (due, seq): equal due times run in scheduling order.
    due: BTreeMap<(Duration, u64), DelayedCallback>,
}

/// Virtual-clock delay service.
///
/// Clones share the same timeline.
#[derive(Clone, Default)]
pub struct ManualDelay {
    timeline: Rc<RefCell<Timeline>>,
}

impl ManualDelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.timeline.borrow().now
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.timeline.borrow().due.len()
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline
            .borrow()
            .due
            .first_key_value()
            .map(|((due, _), _)| *due)
    }

    /// Move the clock forward by `delta` and run every callback that falls due, in
    /// due order. Callbacks scheduled along the way run too if they fall due within
    /// the window. Returns how many callbacks ran.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.now().saturating_add(delta);
        let mut ran = 0;
        while let Some(callback) = self.pop_due(target) {
            callback();
            ran += 1;
        }
        self.timeline.borrow_mut().now = target;
        ran
    }

    /// Advance until nothing is pending. Does not return while callbacks keep
    /// scheduling new ones.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(due) = self.next_due() {
            ran += self.advance(due.saturating_sub(self.now()));
        }
        ran
    }

    fn pop_due(&self, target: Duration) -> Option<DelayedCallback> {
        let mut timeline = self.timeline.borrow_mut();
        let entry = timeline.due.first_entry()?;
        if entry.key().0 > target {
            return None;
        }
        let ((due, _), callback) = entry.remove_entry();
        timeline.now = due;
        Some(callback)
    }
}

impl Delay for ManualDelay {
    fn schedule_after(&self, after: Duration, callback: DelayedCallback) {
        let mut timeline = self.timeline.borrow_mut();
        let due = timeline.now.saturating_add(after);
        let seq = timeline.next_seq;
        timeline.next_seq += 1;
        timeline.due.insert((due, seq), callback);
        tracing::trace!(after_ms = after.as_millis(), due_ms = due.as_millis(), "scheduled callback");
    }
}

impl fmt::Debug for ManualDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualDelay")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Tokio-backed delay service bound to a single-threaded [`LocalSet`].
///
/// Callbacks only run while the set is being driven, e.g. by
/// [`LocalSet::run_until`] on a current-thread runtime.
#[derive(Clone)]
pub struct LocalDelay {
    set: Rc<LocalSet>,
}

impl LocalDelay {
    #[must_use]
    pub fn new(set: Rc<LocalSet>) -> Self {
        Self { set }
    }
}

impl Delay for LocalDelay {
    fn schedule_after(&self, after: Duration, callback: DelayedCallback) {
        tracing::trace!(after_ms = after.as_millis(), "spawning delayed callback");
        self.set.spawn_local(async move {
            time::sleep(after).await;
            callback();
        });
    }
}

impl fmt::Debug for LocalDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalDelay").finish_non_exhaustive()
    }
}
