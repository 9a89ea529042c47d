//! One-shot input pulse

use std::sync::atomic::{AtomicBool, Ordering};

/// A boolean request that input code raises and the frame loop consumes.
///
/// Any number of `request` calls between two frames collapse into a single
/// pulse; `take` observes it exactly once.
#[derive(Debug, Default)]
pub struct RisePulse {
    requested: AtomicBool,
}

impl RisePulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the pulse. Safe to call from an input thread.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Consume the pulse, clearing it
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
