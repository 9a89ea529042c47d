//! Petalfall Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a host uses to drive the simulation:
//! - `FrameClock`: variable-step clock with frame counter and dt clamping
//! - `LifecycleEvent` / `Lifecycle`: detachment and delayed-shutdown signals for the host
//! - `RisePulse`: one-shot input flag set from any thread, consumed once per frame
//! - `ShutdownTimer`: delayed, single-fire shutdown request
//! - `RuntimeSystem`: trait for systems ticked by the frame loop

mod clock;
mod event;
mod lifecycle;
mod pulse;
mod shutdown;
mod system;

pub use clock::FrameClock;
pub use event::LifecycleEvent;
pub use lifecycle::Lifecycle;
pub use pulse::RisePulse;
pub use shutdown::ShutdownTimer;
pub use system::RuntimeSystem;
