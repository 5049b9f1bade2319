//! Level counter face: a bounded value plus the flip effect that is playing on it.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

use crate::ui::{AnimPhase, FlipEffect, FlipKind};

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaceError {
    #[error("value {value} is outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

#[derive(Debug, Clone)]
pub struct CounterFace {
    value: i64,
    min: i64,
    max: i64,
    effect: Option<FlipEffect>,
}

impl CounterFace {
    /// A face bounded to player levels (`MIN_LEVEL..=MAX_LEVEL`).
    pub fn level(value: i64) -> Result<Self, FaceError> {
        Self::with_range(value, MIN_LEVEL..=MAX_LEVEL)
    }

    pub fn with_range(value: i64, range: RangeInclusive<i64>) -> Result<Self, FaceError> {
        let (min, max) = range.into_inner();
        check_range(value, min, max)?;
        Ok(Self {
            value,
            min,
            max,
            effect: None,
        })
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }

    #[must_use]
    pub fn range(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }

    /// Land on `value`, ending any flip in progress. Out-of-range values leave the
    /// face unchanged.
    pub fn set(&mut self, value: i64) -> Result<(), FaceError> {
        check_range(value, self.min, self.max)?;
        self.value = value;
        self.effect = None;
        Ok(())
    }

    pub fn start_flip(&mut self, kind: FlipKind, duration: Duration) {
        self.effect = Some(FlipEffect::new(kind, duration));
    }

    pub fn clear_flip(&mut self) {
        self.effect = None;
    }

    #[must_use]
    pub fn effect(&self) -> Option<&FlipEffect> {
        self.effect.as_ref()
    }

    #[must_use]
    pub fn is_flipping(&self) -> bool {
        self.effect.is_some()
    }

    /// Advance the flip by one frame; a completed flip is dropped.
    pub fn advance(&mut self, delta: Duration) {
        if let Some(effect) = self.effect.as_mut() {
            effect.advance(delta);
            if matches!(effect.phase(), AnimPhase::Completed) {
                self.effect = None;
            }
        }
    }
}

impl fmt::Display for CounterFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effect.as_ref().map(FlipEffect::phase) {
            Some(AnimPhase::Running { progress }) => {
                let glyph = self.effect.as_ref().map_or(' ', |e| e.kind().glyph());
                write!(f, "[{glyph} {:>2} {:>3}%]", self.value, (progress * 100.0).round() as u32)
            }
            Some(AnimPhase::Completed) | None => write!(f, "[  {:>2}     ]", self.value),
        }
    }
}

fn check_range(value: i64, min: i64, max: i64) -> Result<(), FaceError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FaceError::OutOfRange { value, min, max })
    }
}
