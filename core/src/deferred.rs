//! Deferred sequencing of zero-argument callbacks.
//!
//! A [`Deferred`] collects continuations and runs them in registration order when
//! the [`Trigger`] returned by [`Deferred::resolve`] is fired. Rejection is a one-way
//! flag checked before every continuation and once more after the last one, so a
//! continuation that rejects its own sequencer (see [`Deferred::chain_with_control`])
//! stops everything registered after it and routes the pass to the failure handler.
//!
//! # Lifecycle
//!
//! ```text
//! Pending --fire--> Resolving --> Settled(Outcome)
//! ```
//!
//! A sequencer settles exactly once. Firing any trigger of a settled sequencer
//! returns [`ResolveError::AlreadySettled`] and runs nothing.
//!
//! # Threading
//!
//! State lives behind `Rc` and `Cell`, so none of these types are `Send`. Every
//! continuation runs synchronously on the thread that fires the trigger.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use thiserror::Error;

type Callback = Box<dyn FnOnce()>;

/// How a resolution pass ended.
///
/// `ran` counts the continuations that executed. On rejection this is the prefix
/// that ran before the rejection was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed { ran: usize },
    Rejected { ran: usize },
}

impl Outcome {
    #[must_use]
    pub const fn ran(self) -> usize {
        match self {
            Self::Completed { ran } | Self::Rejected { ran } => ran,
        }
    }

    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The trigger was fired from inside the sequencer's own running pass.
    #[error("resolution pass is already running")]
    InProgress,
    #[error("sequencer already settled: {outcome:?}")]
    AlreadySettled { outcome: Outcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Pending,
    Resolving,
    Settled(Outcome),
}

struct Inner {
    continuations: RefCell<VecDeque<Callback>>,
    on_complete: RefCell<Option<Callback>>,
    on_failure: RefCell<Option<Callback>>,
    rejected: Cell<bool>,
    lifecycle: Cell<Lifecycle>,
}

impl Inner {
    fn new() -> Self {
        Self {
            continuations: RefCell::new(VecDeque::new()),
            on_complete: RefCell::new(None),
            on_failure: RefCell::new(None),
            rejected: Cell::new(false),
            lifecycle: Cell::new(Lifecycle::Pending),
        }
    }

    // The RefMut must be released before the continuation runs, so this stays a
    // separate function rather than a `while let` scrutinee.
    fn next_continuation(&self) -> Option<Callback> {
        self.continuations.borrow_mut().pop_front()
    }

    fn run_pass(&self) -> Result<Outcome, ResolveError> {
        match self.lifecycle.get() {
            Lifecycle::Pending => {}
            Lifecycle::Resolving => return Err(ResolveError::InProgress),
            Lifecycle::Settled(outcome) => return Err(ResolveError::AlreadySettled { outcome }),
        }
        self.lifecycle.set(Lifecycle::Resolving);

        let mut ran = 0;
        while let Some(continuation) = self.next_continuation() {
            if self.rejected.get() {
                drop(continuation);
                return Ok(self.settle(Outcome::Rejected { ran }));
            }
            continuation();
            ran += 1;
        }

        // The final continuation may have rejected after the in-loop check.
        let outcome = if self.rejected.get() {
            Outcome::Rejected { ran }
        } else {
            Outcome::Completed { ran }
        };
        Ok(self.settle(outcome))
    }

    fn settle(&self, outcome: Outcome) -> Outcome {
        let skipped = self.continuations.take();
        self.lifecycle.set(Lifecycle::Settled(outcome));

        let (handler, unused) = match outcome {
            Outcome::Completed { .. } => (self.on_complete.take(), self.on_failure.take()),
            Outcome::Rejected { .. } => (self.on_failure.take(), self.on_complete.take()),
        };
        tracing::trace!(
            ?outcome,
            skipped = skipped.len(),
            handler = handler.is_some(),
            "resolution pass settled"
        );
        drop(skipped);
        drop(unused);

        if let Some(handler) = handler {
            handler();
        }
        outcome
    }
}

/// A pending sequence of continuations with a shared rejection flag.
///
/// Cloning yields another handle to the same sequencer.
#[derive(Clone)]
pub struct Deferred {
    inner: Rc<Inner>,
}

impl Deferred {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner::new()),
        }
    }

    /// Alias for [`Deferred::new`].
    #[must_use]
    pub fn defer() -> Self {
        Self::new()
    }

    /// Append a continuation.
    ///
    /// Continuations chained while a pass is running are appended to that pass.
    /// After settlement they are dropped without running.
    pub fn chain(&self, callback: impl FnOnce() + 'static) -> &Self {
        self.push(Box::new(callback));
        self
    }

    /// Append a continuation that receives this sequencer when it runs, so it can
    /// call [`Deferred::reject`].
    ///
    /// The stored continuation holds a weak reference; it never keeps its own
    /// sequencer alive.
    pub fn chain_with_control(&self, callback: impl FnOnce(&Deferred) + 'static) -> &Self {
        let handle: Weak<Inner> = Rc::downgrade(&self.inner);
        self.push(Box::new(move || {
            if let Some(inner) = handle.upgrade() {
                callback(&Deferred { inner });
            }
        }));
        self
    }

    /// Register the failure handler, replacing any earlier one.
    ///
    /// The returned [`Finishable`] only accepts a completion handler, so nothing
    /// else can be chained through it.
    pub fn on_failure_then(&self, callback: impl FnOnce() + 'static) -> Finishable<'_> {
        self.set_handler(&self.inner.on_failure, Box::new(callback), "failure");
        Finishable { deferred: self }
    }

    /// Register the completion handler, replacing any earlier one.
    pub fn on_complete_then(&self, callback: impl FnOnce() + 'static) {
        self.set_handler(&self.inner.on_complete, Box::new(callback), "completion");
    }

    /// Mark the sequencer rejected. Idempotent.
    pub fn reject(&self) {
        if !self.inner.rejected.replace(true) {
            tracing::trace!("sequencer rejected");
        }
    }

    /// Produce the trigger that runs the resolution pass.
    ///
    /// Nothing runs until [`Trigger::fire`] is called, which lets the caller hand
    /// the trigger to a timer.
    pub fn resolve(&self) -> Trigger {
        Trigger {
            inner: Rc::clone(&self.inner),
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.inner.rejected.get()
    }

    /// Continuations registered and not yet run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.continuations.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a failure handler is registered and has not been consumed.
    #[must_use]
    pub fn has_failure_handler(&self) -> bool {
        self.inner.on_failure.borrow().is_some()
    }

    /// Whether a completion handler is registered and has not been consumed.
    #[must_use]
    pub fn has_completion_handler(&self) -> bool {
        self.inner.on_complete.borrow().is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self.inner.lifecycle.get() {
            Lifecycle::Settled(outcome) => Some(outcome),
            Lifecycle::Pending | Lifecycle::Resolving => None,
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    fn push(&self, continuation: Callback) {
        if let Lifecycle::Settled(outcome) = self.inner.lifecycle.get() {
            tracing::warn!(?outcome, "dropping continuation chained after settlement");
            return;
        }
        self.inner.continuations.borrow_mut().push_back(continuation);
    }

    fn set_handler(&self, slot: &RefCell<Option<Callback>>, callback: Callback, kind: &str) {
        if let Lifecycle::Settled(outcome) = self.inner.lifecycle.get() {
            tracing::warn!(?outcome, kind, "dropping handler registered after settlement");
            return;
        }
        // `replace` releases the borrow before the previous handler is dropped.
        let previous = slot.replace(Some(callback));
        drop(previous);
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("pending", &self.len())
            .field("rejected", &self.is_rejected())
            .field("lifecycle", &self.inner.lifecycle.get())
            .finish_non_exhaustive()
    }
}

/// Completion-only view of a [`Deferred`], returned by [`Deferred::on_failure_then`].
///
/// Chaining is not available once a failure handler has been set through the
/// fluent surface:
///
/// ```compile_fail
/// use tally_core::Deferred;
///
/// let deferred = Deferred::new();
/// deferred.chain(|| {}).on_failure_then(|| {}).chain(|| {});
/// ```
///
/// Neither is registering a second failure handler:
///
/// ```compile_fail
/// use tally_core::Deferred;
///
/// let deferred = Deferred::new();
/// deferred.on_failure_then(|| {}).on_failure_then(|| {});
/// ```
pub struct Finishable<'a> {
    deferred: &'a Deferred,
}

impl Finishable<'_> {
    pub fn on_complete_then(self, callback: impl FnOnce() + 'static) {
        self.deferred.on_complete_then(callback);
    }
}

impl fmt::Debug for Finishable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Finishable").field(self.deferred).finish()
    }
}

/// Runs a [`Deferred`]'s resolution pass when fired.
#[must_use = "nothing runs until the trigger is fired"]
pub struct Trigger {
    inner: Rc<Inner>,
}

impl Trigger {
    /// Run the resolution pass synchronously.
    pub fn fire(self) -> Result<Outcome, ResolveError> {
        self.inner.run_pass()
    }

    /// Wrap the trigger as a plain callback for a timer or scheduler.
    ///
    /// A misfire is logged and otherwise ignored.
    pub fn into_callback(self) -> impl FnOnce() + 'static {
        move || {
            if let Err(err) = self.fire() {
                tracing::warn!(%err, "resolution trigger misfired");
            }
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("lifecycle", &self.inner.lifecycle.get())
            .finish_non_exhaustive()
    }
}
