//! Damping, smoothing and probability helpers
//!
//! All functions are frame-rate independent: they take the elapsed time `dt`
//! explicitly and produce the same long-run behavior for any step size.

use glam::Vec3;

/// Shortest smoothing time accepted by the `smooth_damp` family
const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Exponential decay: `value * smoothing^dt`.
///
/// `smoothing` is the fraction of `value` left after one second.
pub fn damp(value: f32, smoothing: f32, dt: f32) -> f32 {
    value * smoothing.powf(dt)
}

/// Vector form of [`damp`]
pub fn damp_vec3(value: Vec3, smoothing: f32, dt: f32) -> Vec3 {
    value * smoothing.powf(dt)
}

/// Per-step trigger chance for an event with per-second probability `p`.
///
/// Returns `1 - (1 - p)^dt`, so `probability(p, 1.0) == p` and
/// `probability(p, 0.0) == 0`.
pub fn probability(p: f32, dt: f32) -> f32 {
    1.0 - (1.0 - p).powf(dt)
}

/// Critically-damped smoothing of a scalar toward `target`.
///
/// `velocity` carries the smoothing state between calls. `smooth_time` is the
/// approximate time to reach the target. Never overshoots.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let exp = decay_factor(omega * dt);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { 0.0 };
    }

    output
}

/// Vector form of [`smooth_damp`]
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let exp = decay_factor(omega * dt);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Overshoot: the output passed the target along the approach direction
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { Vec3::ZERO };
    }

    output
}

/// Cubic approximation of `e^-x` used by critically-damped smoothing
fn decay_factor(x: f32) -> f32 {
    1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x)
}
