//! Parallel per-petal state update
//!
//! Every index is stepped independently. The only shared state is a pair of
//! append-only queues recording Flying→Grounded and Grounded→Flying
//! transitions; they are read by the event drain after the stage joins.

use crate::config::SimConfig;
use crate::petal::{FallState, PetalRecord};
use crate::wind::WindState;
use crossbeam::queue::SegQueue;
use glam::{EulerRot, Mat4, Quat, Vec3};
use petalfall_core::math::damp_vec3;
use petalfall_core::SimRng;
use rayon::prelude::*;

/// Smallest slice handed to one rayon task
const MIN_CHUNK: usize = 256;

/// Read-only inputs shared by every petal during one step
#[derive(Debug, Clone, Copy)]
pub struct StageParams {
    pub dt: f32,
    pub gravity: f32,
    pub wind_direction: Vec3,
    pub wind_force: f32,
    /// Spin gained per unit wind direction per second, radians
    pub rotation_force: f32,
    pub reference_point: Vec3,
    /// Rise pulse consumed this frame
    pub rise: bool,
    /// Base of the counter RNG used for rise spin
    pub frame_seed: u32,
    pub rise_radius: f32,
    pub rise_speed: f32,
    pub rise_lift: f32,
    pub rise_nudge: f32,
    pub ground_smoothing: f32,
    pub rolling_epsilon: f32,
}

impl StageParams {
    pub fn new(config: &SimConfig, dt: f32, wind: &WindState) -> Self {
        Self {
            dt,
            gravity: config.petals.gravity,
            wind_direction: wind.direction,
            wind_force: wind.force,
            rotation_force: config.petals.rotation_force.to_radians(),
            reference_point: Vec3::ZERO,
            rise: false,
            frame_seed: 0,
            rise_radius: config.rise.radius,
            rise_speed: config.rise.speed,
            rise_lift: config.rise.lift,
            rise_nudge: config.rise.nudge,
            ground_smoothing: config.petals.ground_smoothing,
            rolling_epsilon: config.petals.rolling_epsilon,
        }
    }

    pub fn with_rise(mut self, reference_point: Vec3, rise: bool, frame_seed: u32) -> Self {
        self.reference_point = reference_point;
        self.rise = rise;
        self.frame_seed = frame_seed;
        self
    }
}

/// Transition events produced by one stage run
#[derive(Default)]
pub struct TransitionQueues {
    pub grounded: SegQueue<usize>,
    pub rising: SegQueue<usize>,
}

impl TransitionQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        while self.grounded.pop().is_some() {}
        while self.rising.pop().is_some() {}
    }

    pub fn is_empty(&self) -> bool {
        self.grounded.is_empty() && self.rising.is_empty()
    }
}

/// Step a single petal. Returns whether its matrix must be rewritten.
pub fn step_petal(index: usize, record: &mut PetalRecord, params: &StageParams, queues: &TransitionQueues) -> bool {
    match record.fall_state {
        FallState::Initial => {
            record.fall_state = FallState::Attached;
            true
        }
        FallState::Attached => false,
        FallState::Flying => {
            let dt = params.dt;
            record.velocity.y -= params.gravity * dt;
            record.velocity += params.wind_direction * params.wind_force * dt;
            record.angular_velocity += params.wind_direction * dt * params.rotation_force;
            integrate(record);

            if record.position.y <= 0.0 {
                record.position.y = 0.0;
                record.velocity.y = 0.0;
                record.fall_state = FallState::Grounded;
                queues.grounded.push(index);
            }
            true
        }
        FallState::Grounded => {
            if params.rise && record.position.distance(params.reference_point) < params.rise_radius {
                let mut rng = SimRng::from_counter(params.frame_seed.wrapping_add(index as u32));
                record.angular_velocity = rng.direction() * 1f32.to_radians();

                let away = (record.position - params.reference_point).normalize_or_zero();
                record.velocity = away * params.rise_speed;
                record.velocity.y = params.rise_lift;
                record.position.y += params.rise_nudge;
                record.fall_state = FallState::Flying;
                queues.rising.push(index);
                return true;
            }

            let eps = params.rolling_epsilon;
            if record.velocity.length_squared() > eps || record.angular_velocity.length_squared() > eps {
                record.velocity = damp_vec3(record.velocity, params.ground_smoothing, params.dt);
                record.angular_velocity = damp_vec3(record.angular_velocity, params.ground_smoothing, params.dt);
                integrate(record);
                return true;
            }
            false
        }
    }
}

fn integrate(record: &mut PetalRecord) {
    let w = record.angular_velocity;
    record.position += record.velocity;
    record.rotation = (record.rotation * Quat::from_euler(EulerRot::YXZ, w.y, w.x, w.z)).normalize();
}

/// Step every petal in parallel, rewriting dirty matrices. Returns the dirty count.
pub fn run_stage(
    records: &mut [PetalRecord],
    matrices: &mut [Mat4],
    params: &StageParams,
    queues: &TransitionQueues,
) -> usize {
    debug_assert_eq!(records.len(), matrices.len());
    records
        .par_iter_mut()
        .zip(matrices.par_iter_mut())
        .enumerate()
        .with_min_len(MIN_CHUNK)
        .map(|(index, (record, matrix))| {
            if step_petal(index, record, params, queues) {
                *matrix = record.matrix();
                1
            } else {
                0
            }
        })
        .sum()
}
