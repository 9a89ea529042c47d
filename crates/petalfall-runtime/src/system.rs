//! Runtime system trait

use petalfall_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per frame, with the
/// variable frame time. Collaborators are handed to each system at
/// construction time.
pub trait RuntimeSystem {
    /// Called once before the first update
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
