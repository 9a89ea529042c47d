//! Rate-limited petal release

use crate::petal::{FallState, PetalStore};
use std::collections::VecDeque;

/// Absorbs float error so that whole intervals are not lost to rounding
const INTERVAL_SLACK: f64 = 1e-9;

/// Outcome of one scheduler update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetachReport {
    /// Petals released this update
    pub detached: usize,
    /// The schedule ran dry during this update
    pub exhausted_now: bool,
}

/// Leaky bucket over a FIFO of attached petal indices.
///
/// Elapsed time accumulates; every full `1 / rate` interval releases the
/// front petal. Slow frames catch up by releasing several petals at once.
pub struct DetachScheduler {
    queue: VecDeque<usize>,
    interval: f64,
    timer: f64,
    exhausted: bool,
}

impl DetachScheduler {
    /// Schedule indices in the given order. `rate` must be positive.
    pub fn new(order: impl IntoIterator<Item = usize>, rate: f32) -> Self {
        debug_assert!(rate > 0.0, "detach rate must be positive");
        Self {
            queue: order.into_iter().collect(),
            interval: 1.0 / rate as f64,
            timer: 0.0,
            exhausted: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn update(&mut self, dt: f32, store: &mut PetalStore) -> DetachReport {
        let mut report = DetachReport::default();
        if self.exhausted {
            return report;
        }

        self.timer += dt.max(0.0) as f64;
        while self.timer >= self.interval - INTERVAL_SLACK {
            let Some(index) = self.queue.pop_front() else {
                break;
            };
            self.timer -= self.interval;
            if store.record(index).fall_state == FallState::Attached {
                store.detach(index);
                report.detached += 1;
            }
        }

        if self.queue.is_empty() {
            self.exhausted = true;
            report.exhausted_now = true;
            log::info!("all petals detached");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use petalfall_tree::LeafTransform;

    fn attached_store(count: usize) -> PetalStore {
        let leaves: Vec<LeafTransform> = (0..count)
            .map(|i| LeafTransform {
                position: Vec3::new(i as f32, 4.0, 0.0),
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
            })
            .collect();
        let mut store = PetalStore::from_leaves(&leaves);
        for i in 0..count {
            store.record_mut(i).fall_state = FallState::Attached;
        }
        store
    }

    #[test]
    fn two_per_second_over_one_and_a_half_seconds() {
        let mut store = attached_store(10);
        let mut scheduler = DetachScheduler::new(0..10, 2.0);
        let mut total = 0;
        for _ in 0..15 {
            total += scheduler.update(0.1, &mut store).detached;
        }
        assert_eq!(total, 3);
        assert_eq!(store.census()[FallState::Flying as usize], 3);
        assert_eq!(scheduler.remaining(), 7);
    }

    #[test]
    fn releases_in_schedule_order() {
        let mut store = attached_store(4);
        let mut scheduler = DetachScheduler::new([2, 0, 3, 1], 10.0);
        scheduler.update(0.1, &mut store);
        assert_eq!(store.record(2).fall_state, FallState::Flying);
        assert_eq!(store.attach_state(), &[1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn slow_frame_catches_up() {
        let mut store = attached_store(20);
        let mut scheduler = DetachScheduler::new(0..20, 10.0);
        let report = scheduler.update(0.55, &mut store);
        assert_eq!(report.detached, 5);
        // The leftover half interval carries into the next frame
        assert_eq!(scheduler.update(0.05, &mut store).detached, 1);
    }

    #[test]
    fn exhaustion_reported_once() {
        let mut store = attached_store(2);
        let mut scheduler = DetachScheduler::new(0..2, 100.0);
        let report = scheduler.update(1.0, &mut store);
        assert_eq!(report.detached, 2);
        assert!(report.exhausted_now);
        assert!(scheduler.is_exhausted());

        let again = scheduler.update(1.0, &mut store);
        assert_eq!(again, DetachReport::default());
    }

    #[test]
    fn empty_schedule_exhausts_immediately() {
        let mut store = attached_store(0);
        let mut scheduler = DetachScheduler::new(std::iter::empty(), 1.0);
        assert!(scheduler.update(0.0, &mut store).exhausted_now);
    }
}
