//! Scroll-triggered effects.
//!
//! One effect is a trigger element, a start and end threshold, and a
//! callback that receives progress in `[0, 1]`. Thresholds are fractions of
//! the viewport height measured from its top: an effect with `start = 0.8`
//! and `end = 0.2` begins when the trigger's top edge reaches 80% of the
//! viewport and completes when it reaches 20%.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("thresholds must be finite, got start={start} end={end}")]
    NonFinite { start: f64, end: f64 },

    #[error("start threshold {start} must lie below the end threshold {end} on screen")]
    EmptyRange { start: f64, end: f64 },
}

/// Where the trigger sits relative to the effect's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPhase {
    Before,
    Active,
    After,
}

type Callback = Box<dyn FnMut(f64) + Send>;

pub struct ScrollEffect {
    trigger: String,
    start: f64,
    end: f64,
    callback: Callback,
    last_progress: Option<f64>,
}

impl fmt::Debug for ScrollEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollEffect")
            .field("trigger", &self.trigger)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("last_progress", &self.last_progress)
            .finish_non_exhaustive()
    }
}

impl ScrollEffect {
    pub fn new<F>(trigger: impl Into<String>, start: f64, end: f64, callback: F) -> Result<Self, EffectError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        if !start.is_finite() || !end.is_finite() {
            return Err(EffectError::NonFinite { start, end });
        }
        if start <= end {
            return Err(EffectError::EmptyRange { start, end });
        }
        Ok(Self {
            trigger: trigger.into(),
            start,
            end,
            callback: Box::new(callback),
            last_progress: None,
        })
    }

    /// Selector of the trigger element.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn last_progress(&self) -> Option<f64> {
        self.last_progress
    }

    /// Unclamped progress for a trigger top edge at `trigger_top` pixels
    /// from the viewport top.
    pub fn raw_progress(&self, trigger_top: f64, viewport_height: f64) -> f64 {
        let start_px = self.start * viewport_height;
        let span_px = (self.start - self.end) * viewport_height;
        (start_px - trigger_top) / span_px
    }

    /// Recompute progress and run the callback if it changed.
    pub fn update(&mut self, trigger_top: f64, viewport_height: f64) -> EffectPhase {
        if viewport_height <= 0.0 || !viewport_height.is_finite() || !trigger_top.is_finite() {
            return EffectPhase::Before;
        }

        let raw = self.raw_progress(trigger_top, viewport_height);
        let phase = if raw < 0.0 {
            EffectPhase::Before
        } else if raw > 1.0 {
            EffectPhase::After
        } else {
            EffectPhase::Active
        };

        let progress = raw.clamp(0.0, 1.0);
        if self.last_progress != Some(progress) {
            self.last_progress = Some(progress);
            (self.callback)(progress);
        }
        phase
    }
}

/// A set of scroll effects updated together.
#[derive(Debug, Default)]
pub struct ScrollEffects {
    effects: Vec<ScrollEffect>,
}

impl ScrollEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: ScrollEffect) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Update every effect whose trigger has a known position.
    ///
    /// `positions` maps trigger selectors to their top edge offsets.
    /// Returns the phase of each updated effect in registration order.
    pub fn update(
        &mut self,
        positions: &HashMap<String, f64>,
        viewport_height: f64,
    ) -> Vec<(String, EffectPhase)> {
        self.effects
            .iter_mut()
            .filter_map(|effect| {
                let top = *positions.get(effect.trigger())?;
                let phase = effect.update(top, viewport_height);
                Some((effect.trigger().to_string(), phase))
            })
            .collect()
    }
}
