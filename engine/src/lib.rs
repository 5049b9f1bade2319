//! Timed sequencing for Tally.
//!
//! Connects [`tally_core::Deferred`] sequencers to a [`Delay`] service and uses
//! them to play counter flips one after another.

mod counter;
mod delay;
mod sequence;
pub mod ui;

pub use counter::{CounterFace, FaceError, MAX_LEVEL, MIN_LEVEL};
pub use delay::{Delay, DelayedCallback, LocalDelay, ManualDelay};
pub use sequence::{FlipTiming, Steps, flip_through, flip_to, steps_between};
pub use tally_core::{Deferred, Outcome};
