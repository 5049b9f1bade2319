//! Animation state for counter faces.
//!
//! Pure data types with no IO. Effects are advanced by the caller's frame clock.

mod animation;
mod flip;

pub use animation::AnimPhase;
pub use flip::{FlipEffect, FlipKind};
