//! Fixed-step accumulator
//!
//! Converts wall-clock frame deltas into a whole number of fixed ticks.

use serde::{Deserialize, Serialize};

use crate::consts::{FIXED_DT, MAX_FRAME_DT, MAX_STEPS};

/// Slack for float drift when comparing the accumulator against one step
const STEP_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStepClock {
    /// Seconds per tick
    pub step: f32,
    pub max_steps: u32,
    /// Frame deltas above this are clamped
    pub max_frame_dt: f32,
    accumulator: f32,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(FIXED_DT, MAX_STEPS, MAX_FRAME_DT)
    }
}

impl FixedStepClock {
    pub fn new(step: f32, max_steps: u32, max_frame_dt: f32) -> Self {
        Self {
            step,
            max_steps,
            max_frame_dt,
            accumulator: 0.0,
        }
    }

    /// Feed a frame delta and return how many ticks to run now.
    ///
    /// Leftover time stays in the accumulator, but never more than
    /// `max_steps` ticks' worth, so sustained overload plays as slow motion.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        self.accumulator = self
            .accumulator
            .clamp(0.0, self.step * self.max_steps as f32);
        steps
    }

    /// Time carried to the next frame
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FixedStepClock::default();
        let steps = clock.advance(0.4);
        // 50ms clamp yields three 1/60 s ticks
        assert_eq!(steps, 3);
        assert!(steps <= MAX_STEPS);
        assert!(clock.remainder() >= 0.0 && clock.remainder() < FIXED_DT);
    }

    #[test]
    fn test_step_cap_preserves_remainder() {
        // Loose frame clamp so a 400ms stall reaches the step cap
        let mut clock = FixedStepClock::new(FIXED_DT, MAX_STEPS, 1.0);
        let steps = clock.advance(0.4);
        assert_eq!(steps, MAX_STEPS);
        let carried = clock.remainder();
        assert!(carried > 0.0);
        assert!(carried <= FIXED_DT * MAX_STEPS as f32 + 1e-6);
        // The carried backlog is paid off on the next frame
        let next = clock.advance(0.0);
        assert!(next > 0);
        assert!(clock.remainder() < carried);
    }

    #[test]
    fn test_small_deltas_accumulate() {
        let mut clock = FixedStepClock::default();
        assert_eq!(clock.advance(0.01), 0);
        assert_eq!(clock.advance(0.01), 1);
        assert!((clock.remainder() - (0.02 - FIXED_DT)).abs() < 1e-6);
    }

    #[test]
    fn test_bad_deltas_ignored() {
        let mut clock = FixedStepClock::default();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.remainder(), 0.0);
    }
}
