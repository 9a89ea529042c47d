//! Petal records and the flat state store

use glam::{Mat4, Quat, Vec3};
use petalfall_tree::LeafTransform;

/// Lifecycle of one petal.
///
/// Legal transitions: Initial→Attached→Flying→Grounded, then Grounded↔Flying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FallState {
    #[default]
    Initial = 0,
    Attached = 1,
    Flying = 2,
    Grounded = 3,
}

impl FallState {
    /// Whether `self → next` is a legal transition (or no change)
    pub fn can_become(self, next: FallState) -> bool {
        use FallState::*;
        matches!(
            (self, next),
            (Initial, Initial)
                | (Initial, Attached)
                | (Attached, Attached)
                | (Attached, Flying)
                | (Flying, Flying)
                | (Flying, Grounded)
                | (Grounded, Grounded)
                | (Grounded, Flying)
        )
    }
}

/// Physics state of one petal.
///
/// `velocity` and `angular_velocity` are per-step displacements: forces are
/// scaled by dt when accumulated, integration adds them unscaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PetalRecord {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub angular_velocity: Vec3,
    pub fall_state: FallState,
}

impl PetalRecord {
    pub fn from_leaf(leaf: &LeafTransform) -> Self {
        Self {
            position: leaf.position,
            velocity: Vec3::ZERO,
            rotation: leaf.rotation,
            scale: leaf.scale,
            angular_velocity: Vec3::ZERO,
            fall_state: FallState::Initial,
        }
    }

    /// Instance transform: translation · rotation · scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Flat, index-stable petal storage with parallel render arrays.
///
/// `records`, `matrices` and `attach_state` always have the same length;
/// the store is sized once and never resized.
pub struct PetalStore {
    pub(crate) records: Vec<PetalRecord>,
    pub(crate) matrices: Vec<Mat4>,
    pub(crate) attach_state: Vec<f32>,
}

impl PetalStore {
    /// Seed one petal per leaf, in the given order
    pub fn from_leaves(leaves: &[LeafTransform]) -> Self {
        Self {
            records: leaves.iter().map(PetalRecord::from_leaf).collect(),
            matrices: vec![Mat4::IDENTITY; leaves.len()],
            attach_state: vec![1.0; leaves.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PetalRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> &PetalRecord {
        &self.records[index]
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn attach_state(&self) -> &[f32] {
        &self.attach_state
    }

    /// Release an attached petal into flight and clear its attachment flag
    pub(crate) fn detach(&mut self, index: usize) {
        let record = &mut self.records[index];
        debug_assert_eq!(
            record.fall_state,
            FallState::Attached,
            "petal {index} detached from {:?}",
            record.fall_state
        );
        record.fall_state = FallState::Flying;
        self.attach_state[index] = 0.0;
    }

    /// Count petals per state: [initial, attached, flying, grounded]
    pub fn census(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for record in &self.records {
            counts[record.fall_state as usize] += 1;
        }
        counts
    }

    #[cfg(test)]
    pub(crate) fn record_mut(&mut self, index: usize) -> &mut PetalRecord {
        &mut self.records[index]
    }
}
