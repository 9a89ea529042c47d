//! Petalfall Audio - spatial one-shot cues
//!
//! Provides audio playback for petal transition events:
//! - `ObjectPool`: growable pool with O(1) take/return, used for voices
//! - `AudioBackend`: seam to a concrete output (`SilentBackend`, `KiraBackend`)
//! - `SpatialAudio`: distance culling, voice allocation and auto-return
//! - `PadMixer`: ambient pad crossfading
//! - `CueSink`: the narrow trait the simulation drives

pub mod backend;
#[cfg(feature = "kira")]
pub mod engine;
pub mod pads;
pub mod pool;
pub mod spatial;

pub use backend::{AudioBackend, ClipHandle, SilentBackend, VoiceId};
#[cfg(feature = "kira")]
pub use engine::KiraBackend;
pub use pads::PadMixer;
pub use pool::{ObjectPool, PoolKey};
pub use spatial::{AudioSettings, CueOutcome, CueSink, SpatialAudio, Voice};
