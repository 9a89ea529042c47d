//! Audio backend seam and a silent implementation

use glam::Vec3;
use petalfall_core::{OneShotGroup, Result};

/// A playable clip chosen from a group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipHandle {
    pub group: OneShotGroup,
    /// Backend-specific index within the group
    pub index: usize,
    /// Length in seconds; the voice is recycled after this long
    pub duration: f32,
}

/// Identifies one reusable playback voice
pub type VoiceId = usize;

/// What a concrete audio output must provide
pub trait AudioBackend {
    /// Pick a clip from `group`, or `None` if the group is empty
    fn one_shot_clip(&mut self, group: OneShotGroup) -> Option<ClipHandle>;

    /// Start `clip` on `voice` at a world position.
    ///
    /// Lower `priority` values are more important.
    fn play_at(&mut self, voice: VoiceId, position: Vec3, priority: u32, clip: &ClipHandle) -> Result<()>;

    /// Silence `voice` so it can be reused
    fn stop(&mut self, voice: VoiceId);

    /// Move the listener (observer) used for spatialization
    fn set_listener(&mut self, _position: Vec3) {}

    /// Volume of the looping wind-noise bed, 0..1
    fn set_noise_level(&mut self, _level: f32) {}

    /// Number of ambient pads the backend can crossfade
    fn pad_count(&self) -> usize {
        0
    }

    fn set_pad_volume(&mut self, _pad: usize, _volume: f32) {}
}

/// Backend that plays nothing but reports fixed-length clips.
///
/// Used for headless runs and when no audio device is present.
#[derive(Debug, Clone)]
pub struct SilentBackend {
    pub clip_duration: f32,
    played: usize,
}

impl SilentBackend {
    pub fn new(clip_duration: f32) -> Self {
        Self {
            clip_duration,
            played: 0,
        }
    }

    /// Number of `play_at` calls received
    pub fn played(&self) -> usize {
        self.played
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl AudioBackend for SilentBackend {
    fn one_shot_clip(&mut self, group: OneShotGroup) -> Option<ClipHandle> {
        Some(ClipHandle {
            group,
            index: 0,
            duration: self.clip_duration,
        })
    }

    fn play_at(&mut self, _voice: VoiceId, _position: Vec3, _priority: u32, _clip: &ClipHandle) -> Result<()> {
        self.played += 1;
        Ok(())
    }

    fn stop(&mut self, _voice: VoiceId) {}
}
