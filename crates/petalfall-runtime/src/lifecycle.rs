//! Detachment-to-shutdown lifecycle

use crate::event::LifecycleEvent;
use crate::shutdown::ShutdownTimer;

/// Turns the end of detachment into the host-facing event sequence:
/// `AllPetalsDetached` at once, then `ShutdownRequested` after the close delay.
#[derive(Debug, Default)]
pub struct Lifecycle {
    pending: Vec<LifecycleEvent>,
    detached: bool,
    shutdown: ShutdownTimer,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the last petal has left the tree. Only the first call counts.
    pub fn detachment_finished(&mut self, close_delay: f64) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.pending.push(LifecycleEvent::AllPetalsDetached);
        self.shutdown.arm(close_delay);
    }

    /// Run the close countdown; returns true on the frame shutdown is requested
    pub fn tick(&mut self, dt: f64, fade_seconds: f32) -> bool {
        if !self.shutdown.tick(dt) {
            return false;
        }
        log::info!("Requesting shutdown with a {fade_seconds:.1}s fade");
        self.pending.push(LifecycleEvent::ShutdownRequested { fade_seconds });
        true
    }

    /// Take the events raised since the last call
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn all_detached(&self) -> bool {
        self.detached
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.has_fired()
    }
}
