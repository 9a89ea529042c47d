//! Frame clock with dt clamping and frame counter

use std::time::Instant;

/// Tracks frame time for a variable-step simulation loop
pub struct FrameClock {
    /// Total elapsed simulation time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Upper bound applied to a single frame's delta
    pub max_delta: f64,
    /// Number of completed ticks
    frame: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            max_delta: 0.25,
            frame: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a custom per-frame delta ceiling
    pub fn with_max_delta(max_delta: f64) -> Self {
        Self {
            max_delta,
            ..Self::default()
        }
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by an explicit delta (headless / fixed-rate drivers)
    pub fn advance(&mut self, dt: f64) {
        self.first_tick = false;
        self.delta_time = dt.clamp(0.0, self.max_delta);
        self.total_time += self.delta_time;
        self.frame += 1;
    }

    /// Number of ticks so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame(), 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut clock = FrameClock::with_max_delta(0.1);
        clock.advance(0.5);
        assert!((clock.delta_time - 0.1).abs() < 1e-12);
        clock.advance(0.05);
        assert!((clock.total_time - 0.15).abs() < 1e-12);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = FrameClock::new();
        clock.advance(-1.0);
        assert_eq!(clock.delta_time, 0.0);
    }
}
