//! Ambient pad crossfader
//!
//! Every `switch_every` seconds one pad is picked at random; each pad's
//! volume is smoothed toward 1 if it is current and 0 otherwise.

use petalfall_core::math::smooth_damp;
use petalfall_core::SimRng;

pub struct PadMixer {
    volumes: Vec<f32>,
    velocities: Vec<f32>,
    current: Option<usize>,
    since_change: f32,
    switch_every: f32,
    blend_time: f32,
}

impl PadMixer {
    pub fn new(pad_count: usize, switch_every: f32, blend_time: f32) -> Self {
        Self {
            volumes: vec![0.0; pad_count],
            velocities: vec![0.0; pad_count],
            current: None,
            since_change: 0.0,
            switch_every,
            blend_time,
        }
    }

    /// Advance the crossfade; returns the per-pad volumes
    pub fn update(&mut self, dt: f32, rng: &mut SimRng) -> &[f32] {
        if self.volumes.is_empty() {
            return &self.volumes;
        }

        self.since_change += dt;
        if self.since_change >= self.switch_every {
            self.since_change -= self.switch_every;
            let pad = rng.index(self.volumes.len());
            log::debug!("Switching ambient pad to {pad}");
            self.current = Some(pad);
        }

        for (i, (volume, velocity)) in self.volumes.iter_mut().zip(&mut self.velocities).enumerate() {
            let target = if self.current == Some(i) { 1.0 } else { 0.0 };
            *volume = smooth_damp(*volume, target, velocity, self.blend_time, dt);
        }

        &self.volumes
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_first_switch() {
        let mut mixer = PadMixer::new(3, 10.0, 1.0);
        let mut rng = SimRng::new(5);
        let volumes = mixer.update(1.0, &mut rng);
        assert!(volumes.iter().all(|&v| v == 0.0));
        assert_eq!(mixer.current(), None);
    }

    #[test]
    fn current_pad_fades_in() {
        let mut mixer = PadMixer::new(2, 2.0, 0.5);
        let mut rng = SimRng::new(5);
        for _ in 0..60 {
            mixer.update(0.05, &mut rng);
        }
        let current = mixer.current().unwrap();
        let volumes = mixer.update(0.05, &mut rng).to_vec();
        assert!(volumes[current] > 0.5);
        assert!(volumes.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn no_pads_is_noop() {
        let mut mixer = PadMixer::new(0, 1.0, 1.0);
        let mut rng = SimRng::new(1);
        assert!(mixer.update(5.0, &mut rng).is_empty());
    }
}
