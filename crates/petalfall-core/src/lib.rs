//! Petalfall Core - Foundational types for the petal simulation
//!
//! This crate provides the pieces every other Petalfall crate depends on:
//! - `PetalError` / `Result` - error taxonomy shared across the workspace
//! - `math` - exponential damping, critically-damped smoothing, probability transform
//! - `SimRng` - seeded xorshift generator with counter-based construction
//! - `OneShotGroup` - logical audio cue groups

mod error;
mod group;
pub mod math;
mod rng;

pub use error::{check_range, PetalError, Result};
pub use group::OneShotGroup;
pub use rng::SimRng;
