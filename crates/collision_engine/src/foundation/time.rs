//! Simulation time
//!
//! The collision core never reads the wall clock. Every time-dependent rule
//! (jump cooldown, climb interpolation, platform motion) is driven by a
//! fixed-step [`SimClock`] advanced by the external scheduler, so identical
//! inputs replay identically regardless of frame-time jitter.

use std::time::Duration;

/// Reference rate that "per tick-equivalent" quantities are expressed in.
pub const REFERENCE_TICK_RATE: f32 = 60.0;

/// Fixed-step simulation clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    tick_duration: Duration,
    elapsed: Duration,
    tick_count: u64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_rate(60)
    }
}

impl SimClock {
    /// Create a clock with a fixed tick duration
    pub fn new(tick_duration: Duration) -> Self {
        assert!(!tick_duration.is_zero(), "tick duration must be non-zero");
        Self {
            tick_duration,
            elapsed: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Create a clock ticking `hz` times per second
    pub fn from_rate(hz: u32) -> Self {
        assert!(hz > 0, "tick rate must be non-zero");
        Self::new(Duration::from_nanos(1_000_000_000 / u64::from(hz)))
    }

    /// Advance by exactly one tick
    pub fn advance(&mut self) {
        self.elapsed += self.tick_duration;
        self.tick_count += 1;
    }

    /// Simulation time since the clock started
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    /// Fixed tick duration
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Tick duration in seconds
    pub fn delta_time(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    /// Number of ticks advanced so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// How many reference ticks one of our ticks is worth
    ///
    /// Velocities in this crate are "units per tick-equivalent" of
    /// [`REFERENCE_TICK_RATE`]; multiply by this to get the per-tick change.
    pub fn tick_scale(&self) -> f32 {
        self.delta_time() * REFERENCE_TICK_RATE
    }
}

/// Time elapsed between `since` and `now`, saturating at zero
pub fn elapsed_since(now: Duration, since: Duration) -> Duration {
    now.saturating_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_advances_in_fixed_steps() {
        let mut clock = SimClock::new(Duration::from_millis(10));
        for _ in 0..25 {
            clock.advance();
        }
        assert_eq!(clock.tick_count(), 25);
        assert_eq!(clock.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_tick_scale_at_reference_rate() {
        let clock = SimClock::from_rate(60);
        assert_relative_eq!(clock.tick_scale(), 1.0, epsilon = 1e-4);

        let half = SimClock::from_rate(120);
        assert_relative_eq!(half.tick_scale(), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_elapsed_since_saturates() {
        assert_eq!(
            elapsed_since(Duration::from_millis(5), Duration::from_millis(9)),
            Duration::ZERO
        );
    }
}
