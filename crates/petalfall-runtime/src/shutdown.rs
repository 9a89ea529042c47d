//! Delayed shutdown countdown

/// Counts down from `arm` and fires exactly once when the delay has elapsed
#[derive(Debug, Default)]
pub struct ShutdownTimer {
    remaining: Option<f64>,
    fired: bool,
}

impl ShutdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the countdown. Re-arming an armed or fired timer is ignored.
    pub fn arm(&mut self, delay: f64) {
        if self.remaining.is_none() && !self.fired {
            log::info!("Shutdown scheduled in {delay:.1}s");
            self.remaining = Some(delay.max(0.0));
        }
    }

    /// Advance by `dt`; returns true on the tick the delay runs out
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.remaining = None;
            self.fired = true;
            return true;
        }
        false
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
