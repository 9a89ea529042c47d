//! Single-threaded consumer of transition events

use crate::petal::PetalStore;
use crate::update::TransitionQueues;
use glam::Vec3;
use petalfall_audio::{CueOutcome, CueSink};
use petalfall_core::{OneShotGroup, SimRng};

/// What one drain pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Rising cues handed to the audio sink (0 or 1)
    pub rising_cues: usize,
    /// Rising events dropped by the rate limit
    pub rising_discarded: usize,
    /// Grounded cues handed to the audio sink
    pub grounded_cues: usize,
    /// Cues the sink actually played
    pub played: usize,
}

/// Turns transition events into audio cues.
///
/// Rising cues are rate limited to one per `min_interval`; grounded cues are
/// not limited.
pub struct EventDrain {
    since_trigger: f32,
    min_interval: f32,
    rng: SimRng,
}

impl EventDrain {
    pub fn new(min_interval: f32, seed: u32) -> Self {
        Self {
            since_trigger: 0.0,
            min_interval,
            rng: SimRng::new(seed),
        }
    }

    /// Empty both queues, emitting cues heard from `listener`
    pub fn drain(
        &mut self,
        dt: f32,
        queues: &mut TransitionQueues,
        store: &PetalStore,
        listener: Vec3,
        audio: &mut dyn CueSink,
    ) -> DrainReport {
        let mut report = DrainReport::default();

        self.since_trigger += dt;
        if self.since_trigger > self.min_interval {
            if let Some(index) = queues.rising.pop() {
                self.since_trigger = 0.0;
                report.rising_cues = 1;
                if cue(audio, OneShotGroup::B, store.record(index).position, listener) {
                    report.played += 1;
                }
            }
        }
        while queues.rising.pop().is_some() {
            report.rising_discarded += 1;
        }

        while let Some(index) = queues.grounded.pop() {
            let group = OneShotGroup::GROUNDED[self.rng.index(OneShotGroup::GROUNDED.len())];
            report.grounded_cues += 1;
            if cue(audio, group, store.record(index).position, listener) {
                report.played += 1;
            }
        }

        if report.rising_discarded > 0 {
            log::trace!("discarded {} rising events", report.rising_discarded);
        }
        report
    }
}

fn cue(audio: &mut dyn CueSink, group: OneShotGroup, position: Vec3, listener: Vec3) -> bool {
    match audio.play_cue(group, position, listener) {
        Ok(CueOutcome::Played { .. }) => true,
        Ok(_) => false,
        Err(e) => {
            log::warn!("{} cue failed: {e}", group.name());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use petalfall_audio::PoolKey;
    use petalfall_core::{PetalError, Result};
    use petalfall_tree::LeafTransform;

    #[derive(Default)]
    struct CueLog {
        cues: Vec<(OneShotGroup, Vec3)>,
        fail: bool,
    }

    impl CueSink for CueLog {
        fn play_cue(&mut self, group: OneShotGroup, position: Vec3, _listener: Vec3) -> Result<CueOutcome> {
            if self.fail {
                return Err(PetalError::AudioError("device lost".into()));
            }
            self.cues.push((group, position));
            Ok(CueOutcome::Played {
                voice: PoolKey(self.cues.len()),
                priority: 2,
            })
        }
    }

    fn store(count: usize) -> PetalStore {
        let leaves: Vec<LeafTransform> = (0..count)
            .map(|i| LeafTransform {
                position: Vec3::new(i as f32, 0.0, 0.0),
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
            })
            .collect();
        PetalStore::from_leaves(&leaves)
    }

    #[test]
    fn grounded_events_all_play_from_grounded_groups() {
        let store = store(50);
        let mut queues = TransitionQueues::new();
        for i in 0..50 {
            queues.grounded.push(i);
        }
        let mut sink = CueLog::default();
        let mut drain = EventDrain::new(0.15, 9);

        let report = drain.drain(0.016, &mut queues, &store, Vec3::ZERO, &mut sink);
        assert_eq!(report.grounded_cues, 50);
        assert_eq!(report.played, 50);
        assert!(queues.is_empty());
        assert!(sink.cues.iter().all(|(g, _)| OneShotGroup::GROUNDED.contains(g)));
    }

    #[test]
    fn rising_is_rate_limited() {
        let store = store(10);
        let mut queues = TransitionQueues::new();
        let mut sink = CueLog::default();
        let mut drain = EventDrain::new(0.15, 9);

        for i in 0..5 {
            queues.rising.push(i);
        }
        let first = drain.drain(0.2, &mut queues, &store, Vec3::ZERO, &mut sink);
        assert_eq!(first.rising_cues, 1);
        assert_eq!(first.rising_discarded, 4);
        assert!(queues.is_empty());

        queues.rising.push(6);
        let second = drain.drain(0.1, &mut queues, &store, Vec3::ZERO, &mut sink);
        assert_eq!(second.rising_cues, 0);
        assert_eq!(second.rising_discarded, 1);

        queues.rising.push(7);
        let third = drain.drain(0.1, &mut queues, &store, Vec3::ZERO, &mut sink);
        assert_eq!(third.rising_cues, 1);

        assert_eq!(sink.cues.len(), 2);
        assert!(sink.cues.iter().all(|(g, _)| *g == OneShotGroup::B));
        assert_eq!(sink.cues[1].1, Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn audio_failure_does_not_stop_drain() {
        let store = store(3);
        let mut queues = TransitionQueues::new();
        for i in 0..3 {
            queues.grounded.push(i);
        }
        let mut sink = CueLog {
            fail: true,
            ..Default::default()
        };
        let report = EventDrain::new(0.15, 1).drain(0.016, &mut queues, &store, Vec3::ZERO, &mut sink);
        assert_eq!(report.grounded_cues, 3);
        assert_eq!(report.played, 0);
        assert!(queues.is_empty());
    }
}
