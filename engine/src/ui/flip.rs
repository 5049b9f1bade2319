//! Flip effect shown while a counter changes value.

use std::time::Duration;

use super::animation::{AnimPhase, EffectTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipKind {
    FlipUp,
    FlipDown,
}

impl FlipKind {
    /// Direction for a change from `from` to `to`. Equal values flip up.
    #[must_use]
    pub fn between(from: i64, to: i64) -> Self {
        if to < from { Self::FlipDown } else { Self::FlipUp }
    }

    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::FlipUp => '▲',
            Self::FlipDown => '▼',
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlipEffect {
    kind: FlipKind,
    timer: EffectTimer,
}

impl FlipEffect {
    #[must_use]
    pub fn flip_up(duration: Duration) -> Self {
        Self::new(FlipKind::FlipUp, duration)
    }

    #[must_use]
    pub fn flip_down(duration: Duration) -> Self {
        Self::new(FlipKind::FlipDown, duration)
    }

    #[must_use]
    pub fn new(kind: FlipKind, duration: Duration) -> Self {
        Self {
            kind,
            timer: EffectTimer::new(duration),
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.timer.advance(delta);
    }

    #[must_use]
    pub fn phase(&self) -> AnimPhase {
        self.timer.phase()
    }

    #[must_use]
    pub fn kind(&self) -> FlipKind {
        self.kind
    }
}
