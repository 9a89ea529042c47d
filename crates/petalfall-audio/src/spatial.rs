//! Spatial one-shot playback over a pooled set of voices

use crate::backend::{AudioBackend, ClipHandle};
use crate::pads::PadMixer;
use crate::pool::{ObjectPool, PoolKey};
use glam::Vec3;
use petalfall_core::{check_range, OneShotGroup, PetalError, Result, SimRng};
use serde::{Deserialize, Serialize};

/// Voice pool and spatial playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Voices allocated up front
    pub voice_capacity: usize,
    /// Hard cap on voice growth; `None` grows without bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_ceiling: Option<usize>,
    /// Cues at or beyond this distance from the listener are dropped
    pub cull_distance: f32,
    /// Ambient pad switch period in seconds
    pub switch_pad_every: f32,
    /// Ambient pad crossfade reach time in seconds
    pub pad_blend_time: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            voice_capacity: 1000,
            voice_ceiling: None,
            cull_distance: 100.0,
            switch_pad_every: 20.0,
            pad_blend_time: 5.0,
        }
    }
}

impl AudioSettings {
    pub fn validate(&self) -> Result<()> {
        if self.voice_capacity == 0 {
            return Err(PetalError::invalid_config(
                "audio.voice_capacity",
                "must be at least 1",
            ));
        }
        if let Some(ceiling) = self.voice_ceiling {
            if ceiling < self.voice_capacity {
                return Err(PetalError::invalid_config(
                    "audio.voice_ceiling",
                    "must not be below voice_capacity",
                ));
            }
        }
        check_range("audio.cull_distance", self.cull_distance, 0.0, f32::MAX)?;
        check_range("audio.switch_pad_every", self.switch_pad_every, 1.0, 30.0)?;
        check_range("audio.pad_blend_time", self.pad_blend_time, 0.0, 10.0)?;
        Ok(())
    }
}

/// Result of a cue request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueOutcome {
    Played { voice: PoolKey, priority: u32 },
    /// Too far from the listener
    Culled,
    /// The backend has no clip for the group
    NoClip,
}

/// The narrow interface the simulation uses to make noise
pub trait CueSink {
    /// Play a cue of `group` at `position`, heard from `listener`
    fn play_cue(&mut self, group: OneShotGroup, position: Vec3, listener: Vec3) -> Result<CueOutcome>;

    /// Advance voice timers and ambient layers
    fn advance(&mut self, _dt: f32) -> Result<()> {
        Ok(())
    }

    /// Drive the ambient wind-noise bed, 0..1
    fn set_ambient_level(&mut self, _level: f32) {}
}

/// Per-voice bookkeeping
#[derive(Debug, Clone, Default)]
pub struct Voice {
    pub clip: Option<ClipHandle>,
    pub position: Vec3,
}

struct PendingReturn {
    voice: PoolKey,
    remaining: f32,
}

/// Spatial cue player: culls by distance, allocates voices from a pool and
/// returns them once their clip has finished.
pub struct SpatialAudio<B: AudioBackend> {
    backend: B,
    voices: ObjectPool<Voice>,
    pending: Vec<PendingReturn>,
    pads: PadMixer,
    rng: SimRng,
    cull_distance: f32,
}

impl<B: AudioBackend> SpatialAudio<B> {
    pub fn new(backend: B, settings: &AudioSettings, seed: u32) -> Result<Self> {
        settings.validate()?;

        let mut voices = ObjectPool::new(settings.voice_capacity, Voice::default).with_cleanup(|voice| {
            voice.clip = None;
        });
        if let Some(ceiling) = settings.voice_ceiling {
            voices = voices.with_ceiling(ceiling);
        }
        let pads = PadMixer::new(
            backend.pad_count(),
            settings.switch_pad_every,
            settings.pad_blend_time,
        );

        Ok(Self {
            backend,
            voices,
            pending: Vec::new(),
            pads,
            rng: SimRng::new(seed),
            cull_distance: settings.cull_distance,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn voices_in_use(&self) -> usize {
        self.voices.in_use()
    }

    pub fn voice_capacity(&self) -> usize {
        self.voices.capacity()
    }
}

impl<B: AudioBackend> CueSink for SpatialAudio<B> {
    fn play_cue(&mut self, group: OneShotGroup, position: Vec3, listener: Vec3) -> Result<CueOutcome> {
        let distance = position.distance(listener);
        if distance >= self.cull_distance {
            return Ok(CueOutcome::Culled);
        }
        let Some(clip) = self.backend.one_shot_clip(group) else {
            return Ok(CueOutcome::NoClip);
        };

        let key = self.voices.take()?;
        let priority = 2 + distance.floor() as u32;

        self.backend.set_listener(listener);
        if let Err(e) = self.backend.play_at(key.0, position, priority, &clip) {
            self.voices.give_back(key)?;
            return Err(e);
        }

        if let Some(voice) = self.voices.get_mut(key) {
            voice.clip = Some(clip);
            voice.position = position;
        }
        self.pending.push(PendingReturn {
            voice: key,
            remaining: clip.duration,
        });

        Ok(CueOutcome::Played {
            voice: key,
            priority,
        })
    }

    fn advance(&mut self, dt: f32) -> Result<()> {
        for i in (0..self.pending.len()).rev() {
            self.pending[i].remaining -= dt;
            if self.pending[i].remaining <= 0.0 {
                let done = self.pending.swap_remove(i);
                self.backend.stop(done.voice.0);
                if let Err(e) = self.voices.give_back(done.voice) {
                    log::warn!("Voice {} could not be returned: {e}", done.voice.0);
                }
            }
        }

        let volumes = self.pads.update(dt, &mut self.rng);
        for (pad, &volume) in volumes.iter().enumerate() {
            self.backend.set_pad_volume(pad, volume);
        }
        Ok(())
    }

    fn set_ambient_level(&mut self, level: f32) {
        self.backend.set_noise_level(level.clamp(0.0, 1.0));
    }
}
