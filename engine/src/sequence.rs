//! Counter flips driven by deferred sequencers.
//!
//! Each flip is one [`Deferred`]: the flip starts immediately, and the delay service
//! fires the trigger once the flip duration has elapsed. The value lands in the
//! first continuation, so anything the caller chains afterwards sees the new value.
//! Longer runs hop from one flip to the next by starting a new sequencer from the
//! previous one's completion handler.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::iter::{FusedIterator, Peekable};
use std::rc::Rc;
use std::time::Duration;

use tally_config::AnimationConfig;
use tally_core::Deferred;

use crate::counter::CounterFace;
use crate::delay::Delay;
use crate::ui::FlipKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipTiming {
    /// Length of one flip.
    pub flip: Duration,
    /// Pause between consecutive flips.
    pub gap: Duration,
}

impl From<AnimationConfig> for FlipTiming {
    fn from(config: AnimationConfig) -> Self {
        Self {
            flip: config.flip_duration(),
            gap: config.step_gap(),
        }
    }
}

/// Flip `face` to `value` over `duration`.
///
/// The returned sequencer is rejected if `value` is outside the face's range; the
/// face then keeps its old value.
pub fn flip_to<D>(delay: &D, face: &Rc<RefCell<CounterFace>>, value: i64, duration: Duration) -> Deferred
where
    D: Delay + ?Sized,
{
    let deferred = Deferred::new();
    let kind = {
        let mut face = face.borrow_mut();
        let kind = FlipKind::between(face.value(), value);
        face.start_flip(kind, duration);
        kind
    };

    let target = Rc::clone(face);
    deferred.chain_with_control(move |d| {
        let mut face = target.borrow_mut();
        if let Err(err) = face.set(value) {
            tracing::debug!(%err, "flip target rejected");
            face.clear_flip();
            d.reject();
        }
    });

    tracing::debug!(value, ?kind, duration_ms = duration.as_millis(), "flip started");
    delay.resolve_after(duration, &deferred);
    deferred
}

/// Flip through `values` one after another, pausing `timing.gap` between flips.
///
/// The returned sequencer resolves after the last flip lands. If a flip is
/// rejected, the remaining values are skipped and the returned sequencer resolves
/// rejected. It is always resolved through the delay service, never synchronously,
/// so the caller can chain on it first.
pub fn flip_through<D, V>(
    delay: &D,
    face: &Rc<RefCell<CounterFace>>,
    values: V,
    timing: FlipTiming,
) -> Deferred
where
    D: Delay + Clone + 'static,
    V: IntoIterator<Item = i64>,
    V::IntoIter: 'static,
{
    let sequence = Deferred::new();
    let plan = FlipPlan {
        delay: delay.clone(),
        face: Rc::clone(face),
        remaining: values.into_iter().peekable(),
        timing,
        sequence: sequence.clone(),
    };
    tracing::debug!(from = face.borrow().value(), "flip sequence started");
    plan.step();
    sequence
}

/// Values strictly after `from` up to and including `to`, one step at a time.
///
/// Lazy: a far-off `to` costs nothing until the steps are taken.
#[must_use]
pub fn steps_between(from: i64, to: i64) -> Steps {
    let next = match from.cmp(&to) {
        Ordering::Less => from.checked_add(1),
        Ordering::Greater => from.checked_sub(1),
        Ordering::Equal => None,
    };
    Steps {
        next,
        to,
        rising: to > from,
    }
}

/// Iterator returned by [`steps_between`].
#[derive(Debug, Clone)]
pub struct Steps {
    next: Option<i64>,
    to: i64,
    rising: bool,
}

impl Iterator for Steps {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let value = self.next?;
        self.next = if value == self.to {
            None
        } else if self.rising {
            value.checked_add(1)
        } else {
            value.checked_sub(1)
        };
        Some(value)
    }
}

impl FusedIterator for Steps {}

struct FlipPlan<D, I: Iterator<Item = i64>> {
    delay: D,
    face: Rc<RefCell<CounterFace>>,
    remaining: Peekable<I>,
    timing: FlipTiming,
    sequence: Deferred,
}

impl<D, I> FlipPlan<D, I>
where
    D: Delay + Clone + 'static,
    I: Iterator<Item = i64> + 'static,
{
    fn step(mut self) {
        let Some(value) = self.remaining.next() else {
            self.delay.resolve_after(Duration::ZERO, &self.sequence);
            return;
        };

        let flip = flip_to(&self.delay, &self.face, value, self.timing.flip);
        let sequence = self.sequence.clone();
        let delay = self.delay.clone();
        flip.on_failure_then(move || {
            tracing::debug!(value, "flip sequence stopped");
            sequence.reject();
            delay.resolve_after(Duration::ZERO, &sequence);
        })
        .on_complete_then(move || {
            if self.remaining.peek().is_none() {
                self.step();
            } else {
                let delay = self.delay.clone();
                let gap = self.timing.gap;
                delay.schedule_after(gap, Box::new(move || self.step()));
            }
        });
    }
}
