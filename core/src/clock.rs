//! Fixed-timestep accumulator converting frame time into whole ticks.

use std::time::Duration;

/// Simulation ticks per second of unscaled time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Duration of a single fixed simulation tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICKS_PER_SECOND as u64);

/// Most ticks a single frame may advance before surplus time is dropped.
pub const MAX_TICKS_PER_FRAME: u32 = 5;

/// Accumulates scaled wall-clock time and releases it as fixed ticks.
#[derive(Clone, Debug)]
pub struct FixedStep {
    step: Duration,
    max_ticks: u32,
    accumulator: Duration,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(TICK_DURATION, MAX_TICKS_PER_FRAME)
    }
}

impl FixedStep {
    /// Creates an accumulator releasing ticks of `step`, at most `max_ticks` per frame.
    #[must_use]
    pub const fn new(step: Duration, max_ticks: u32) -> Self {
        Self {
            step,
            max_ticks,
            accumulator: Duration::ZERO,
        }
    }

    /// Adds a frame's worth of time and returns the number of ticks to run.
    ///
    /// When the per-frame cap is reached any remaining whole steps are
    /// discarded so a slow frame never snowballs into longer catch-up work.
    pub fn advance(&mut self, frame: Duration, time_scale: f32) -> u32 {
        if self.step.is_zero() || !time_scale.is_finite() || time_scale <= 0.0 {
            return 0;
        }

        let scaled = if time_scale == 1.0 {
            frame
        } else {
            frame.mul_f64(f64::from(time_scale))
        };
        self.accumulator = self.accumulator.saturating_add(scaled);

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }

        ticks
    }

    /// Time carried over toward the next tick.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Drops any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(clock.advance(Duration::from_millis(6), 1.0), 0);
        assert_eq!(clock.advance(Duration::from_millis(6), 1.0), 1);
        assert_eq!(clock.pending(), Duration::from_millis(2));
    }

    #[test]
    fn caps_ticks_and_discards_surplus() {
        let mut clock = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(clock.advance(Duration::from_millis(200), 1.0), 5);
        assert_eq!(clock.pending(), Duration::ZERO);
    }

    #[test]
    fn time_scale_speeds_up_simulation() {
        let mut clock = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(clock.advance(Duration::from_millis(10), 2.0), 2);
    }

    #[test]
    fn non_positive_scale_halts() {
        let mut clock = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(clock.advance(Duration::from_millis(100), 0.0), 0);
        assert_eq!(clock.advance(Duration::from_millis(100), f32::NAN), 0);
    }
}
