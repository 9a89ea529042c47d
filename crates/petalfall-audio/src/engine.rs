//! Audio backend wrapping Kira's AudioManager
//!
//! Each pooled voice owns a spatial sub-track that is moved to the cue
//! position before playback. Degrades gracefully when no audio device is
//! available: every call becomes a no-op and clip lookups still work so the
//! voice pool keeps its timing.

use crate::backend::{AudioBackend, ClipHandle, VoiceId};
use glam::Vec3;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::track::{SpatialTrackBuilder, SpatialTrackDistances, SpatialTrackHandle};
use kira::{AudioManager, DefaultBackend, Easing, Tween};
use petalfall_core::{OneShotGroup, PetalError, Result, SimRng};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const INSTANT: Tween = Tween {
    duration: Duration::ZERO,
    easing: Easing::Linear,
    start_time: kira::StartTime::Immediate,
};

/// Smooth tween duration for level changes (avoids clicks)
const LEVEL_TWEEN: Tween = Tween {
    duration: Duration::from_millis(16),
    easing: Easing::Linear,
    start_time: kira::StartTime::Immediate,
};

const SUPPORTED_EXTENSIONS: [&str; 4] = ["ogg", "wav", "mp3", "flac"];

struct VoiceTrack {
    track: SpatialTrackHandle,
    sound: Option<StaticSoundHandle>,
}

/// Kira-backed implementation of [`AudioBackend`]
pub struct KiraBackend {
    manager: Option<AudioManager<DefaultBackend>>,
    listener: Option<kira::listener::ListenerHandle>,
    clips: [Vec<StaticSoundData>; 4],
    voices: HashMap<VoiceId, VoiceTrack>,
    noise: Option<StaticSoundHandle>,
    pads: Vec<StaticSoundHandle>,
    rng: SimRng,
    min_distance: f32,
    max_distance: f32,
}

impl KiraBackend {
    pub fn new(seed: u32) -> Self {
        // Try to create the audio manager; gracefully fail if no device
        let manager = AudioManager::<DefaultBackend>::new(kira::AudioManagerSettings::default())
            .map_err(|e| log::warn!("Audio: no device available ({e}), running silent"))
            .ok();

        Self {
            manager,
            listener: None,
            clips: Default::default(),
            voices: HashMap::new(),
            noise: None,
            pads: Vec::new(),
            rng: SimRng::new(seed),
            min_distance: 2.0,
            max_distance: 100.0,
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Load every supported sound file in `dir` into `group`
    pub fn load_group_dir(&mut self, group: OneShotGroup, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        for path in paths {
            let data = StaticSoundData::from_file(&path)
                .map_err(|e| PetalError::AudioError(format!("Failed to load '{}': {}", path.display(), e)))?;
            self.clips[group.slot()].push(data);
            loaded += 1;
        }

        log::info!("Audio: loaded {loaded} clip(s) into group {}", group.name());
        Ok(loaded)
    }

    /// Start the looping wind-noise bed at zero volume
    pub fn load_noise(&mut self, path: &Path) -> Result<()> {
        self.noise = self.play_looping(path)?;
        Ok(())
    }

    /// Start each ambient pad looping at zero volume
    pub fn load_pads(&mut self, paths: &[&Path]) -> Result<()> {
        for path in paths {
            if let Some(handle) = self.play_looping(path)? {
                self.pads.push(handle);
            }
        }
        Ok(())
    }

    fn play_looping(&mut self, path: &Path) -> Result<Option<StaticSoundHandle>> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| PetalError::AudioError(format!("Failed to load '{}': {}", path.display(), e)))?;
        let Some(manager) = &mut self.manager else {
            return Ok(None);
        };
        let handle = manager
            .play(data.loop_region(..).volume(amplitude_to_db(0.0)))
            .map_err(|e| PetalError::AudioError(format!("Failed to play '{}': {}", path.display(), e)))?;
        Ok(Some(handle))
    }

    fn voice_track(&mut self, voice: VoiceId, position: Vec3) -> Result<Option<&mut VoiceTrack>> {
        let Some(manager) = &mut self.manager else {
            return Ok(None);
        };
        let listener_id = match &self.listener {
            Some(l) => l.id(),
            None => return Err(PetalError::AudioError("No listener created".into())),
        };

        if !self.voices.contains_key(&voice) {
            let builder = SpatialTrackBuilder::new()
                .distances(SpatialTrackDistances {
                    min_distance: self.min_distance,
                    max_distance: self.max_distance,
                })
                .attenuation_function(Some(Easing::OutPowf(2.0)));
            let track = manager
                .add_spatial_sub_track(listener_id, position, builder)
                .map_err(|e| PetalError::AudioError(format!("Failed to create spatial track: {e}")))?;
            self.voices.insert(voice, VoiceTrack { track, sound: None });
        }

        Ok(self.voices.get_mut(&voice))
    }
}

impl AudioBackend for KiraBackend {
    fn one_shot_clip(&mut self, group: OneShotGroup) -> Option<ClipHandle> {
        let clips = &self.clips[group.slot()];
        if clips.is_empty() {
            return None;
        }
        let index = self.rng.index(clips.len());
        Some(ClipHandle {
            group,
            index,
            duration: clips[index].duration().as_secs_f32(),
        })
    }

    fn play_at(&mut self, voice: VoiceId, position: Vec3, _priority: u32, clip: &ClipHandle) -> Result<()> {
        let Some(data) = self.clips[clip.group.slot()].get(clip.index).cloned() else {
            return Err(PetalError::AudioError(format!(
                "clip {} missing from group {}",
                clip.index,
                clip.group.name()
            )));
        };
        let Some(entry) = self.voice_track(voice, position)? else {
            return Ok(());
        };

        entry.track.set_position(position, INSTANT);
        let handle = entry
            .track
            .play(data)
            .map_err(|e| PetalError::AudioError(format!("Failed to play clip: {e}")))?;
        entry.sound = Some(handle);
        Ok(())
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Some(entry) = self.voices.get_mut(&voice) {
            if let Some(mut sound) = entry.sound.take() {
                sound.stop(LEVEL_TWEEN);
            }
        }
    }

    fn set_listener(&mut self, position: Vec3) {
        if let Some(listener) = &mut self.listener {
            listener.set_position(position, INSTANT);
            return;
        }
        let Some(manager) = &mut self.manager else {
            return;
        };
        match manager.add_listener(position, glam::Quat::IDENTITY) {
            Ok(handle) => self.listener = Some(handle),
            Err(e) => log::warn!("Audio: failed to create listener: {e}"),
        }
    }

    fn set_noise_level(&mut self, level: f32) {
        if let Some(noise) = &mut self.noise {
            noise.set_volume(amplitude_to_db(level as f64), LEVEL_TWEEN);
        }
    }

    fn pad_count(&self) -> usize {
        self.pads.len()
    }

    fn set_pad_volume(&mut self, pad: usize, volume: f32) {
        if let Some(handle) = self.pads.get_mut(pad) {
            handle.set_volume(amplitude_to_db(volume as f64), LEVEL_TWEEN);
        }
    }
}

/// Convert linear amplitude (0.0–2.0) to decibels
fn amplitude_to_db(amplitude: f64) -> kira::Decibels {
    if amplitude <= 0.0 {
        kira::Decibels(-60.0) // silence
    } else {
        kira::Decibels((20.0 * (amplitude as f32).log10()).max(-60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_without_clips_reports_none() {
        // Works whether or not the machine has an audio device
        let mut backend = KiraBackend::new(1);
        assert!(backend.one_shot_clip(OneShotGroup::A).is_none());
        backend.set_noise_level(0.5);
        backend.stop(3);
        assert_eq!(backend.pad_count(), 0);
    }

    #[test]
    fn amplitude_conversion_clamps_silence() {
        assert_eq!(amplitude_to_db(0.0).0, -60.0);
        assert!((amplitude_to_db(1.0).0).abs() < 1e-6);
    }
}
