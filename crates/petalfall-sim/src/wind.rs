//! Smoothed stochastic wind
//!
//! Direction and force each relax toward a target that is re-rolled at a
//! frame-rate independent rate. The derived bend/shake values only feed the
//! renderer; physics reads `direction` and `force`.

use crate::config::WindConfig;
use glam::{Quat, Vec3};
use petalfall_core::math::{smooth_damp, smooth_damp_vec3};
use petalfall_core::SimRng;
use std::f32::consts::PI;

/// Scale from normalized wind force to bend angle (radians)
const BEND_SCALE: f32 = 0.17;
/// Shake accumulator speed per radian of bend
const SHAKE_RATE: f32 = 30.0;

/// Wind snapshot for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindState {
    /// Unit direction
    pub direction: Vec3,
    pub force: f32,
    /// Global crown bend, negative with increasing force
    pub bend_angle: f32,
    /// Axis the crown bends around (`direction × up`)
    pub bend_axis: Vec3,
    /// Oscillating shake factor in [-1, 1]
    pub shake: f32,
    /// `|force| / (base + variation)`, clamped to [0, 1]
    pub normalized_force: f32,
}

pub struct WindField {
    config: WindConfig,
    base_direction: Vec3,
    base_tangent: Vec3,
    direction: Vec3,
    direction_target: Vec3,
    direction_velocity: Vec3,
    force: f32,
    force_target: f32,
    force_velocity: f32,
    shake_accumulator: f32,
    rng: SimRng,
    state: WindState,
}

impl WindField {
    /// `config` is assumed validated (non-zero base direction)
    pub fn new(config: &WindConfig, seed: u32) -> Self {
        let base_direction = Vec3::from_array(config.base_direction).normalize_or(Vec3::Z);
        let base_tangent = Vec3::Y.cross(base_direction).normalize_or(Vec3::X);
        let mut rng = SimRng::new(seed);

        let force_target = config.force_base + rng.range(-config.force_variation, config.force_variation);
        let direction_target = random_direction(
            &mut rng,
            base_direction,
            base_tangent,
            config.direction_variation,
            config.direction_variation,
        );

        let mut field = Self {
            config: config.clone(),
            base_direction,
            base_tangent,
            direction: base_direction,
            direction_target,
            direction_velocity: Vec3::ZERO,
            force: 0.0,
            force_target,
            force_velocity: 0.0,
            shake_accumulator: 0.0,
            rng,
            state: WindState {
                direction: base_direction,
                force: 0.0,
                bend_angle: 0.0,
                bend_axis: base_direction.cross(Vec3::Y),
                shake: 0.0,
                normalized_force: 0.0,
            },
        };
        field.refresh_state(0.0);
        field
    }

    /// Advance the wind by `dt` seconds
    pub fn update(&mut self, dt: f32) -> WindState {
        let c = &self.config;

        if self.rng.chance(c.direction_probability, dt) {
            self.direction_target = random_direction(
                &mut self.rng,
                self.base_direction,
                self.base_tangent,
                0.5 * c.direction_variation,
                c.direction_variation,
            );
        }
        let smoothed = smooth_damp_vec3(
            self.direction,
            self.direction_target,
            &mut self.direction_velocity,
            c.direction_reach_time,
            dt,
        );
        self.direction = smoothed.normalize_or(self.base_direction);

        if self.rng.chance(c.force_probability, dt) {
            let roll = self.rng.next_f32();
            self.force_target = c.force_base + roll * roll * c.force_variation;
        }
        self.force = smooth_damp(
            self.force,
            self.force_target,
            &mut self.force_velocity,
            c.force_reach_time,
            dt,
        );

        self.refresh_state(dt);
        self.state
    }

    pub fn state(&self) -> WindState {
        self.state
    }

    fn refresh_state(&mut self, dt: f32) {
        let max_force = self.config.force_base + self.config.force_variation;
        let bend_angle = -self.force / max_force * BEND_SCALE;
        self.shake_accumulator += dt * SHAKE_RATE * bend_angle.abs();

        let a = self.shake_accumulator;
        self.state = WindState {
            direction: self.direction,
            force: self.force,
            bend_angle,
            bend_axis: self.direction.cross(Vec3::Y),
            shake: a.sin() * (a / 2.0).cos() * (a / 4.0).sin() * (a / 8.0).sin(),
            normalized_force: (self.force.abs() / max_force).clamp(0.0, 1.0),
        };
    }
}

/// Base direction yawed about the vertical, then pitched about the tangent
fn random_direction(rng: &mut SimRng, base: Vec3, tangent: Vec3, yaw_scale: f32, pitch_scale: f32) -> Vec3 {
    let yaw = Quat::from_axis_angle(Vec3::Y, rng.range(-PI, PI) * yaw_scale);
    let pitch = Quat::from_axis_angle(tangent, rng.range(-PI, PI) * pitch_scale);
    (pitch * (yaw * base)).normalize_or(base)
}
