//! Seeded fractal recursion producing branches and leaves

use crate::config::TreeConfig;
use glam::{Mat3, Quat, Vec3};
use petalfall_core::{Result, SimRng};
use std::f32::consts::TAU;

/// One branch segment of the tree
#[derive(Debug, Clone, Copy)]
pub struct Branch {
    pub from: Vec3,
    pub to: Vec3,
    pub rotation: Quat,
    /// Remaining recursion depth; 0 for twigs carrying a leaf
    pub depth: u32,
    /// 1 at the root, fading to 0 past `trunk_depth`
    pub trunkness: f32,
}

/// Initial transform of one leaf, the seed state of a petal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// A generated tree: branch segments plus leaves in generation order
#[derive(Debug, Clone)]
pub struct FractalTree {
    pub seed: u32,
    pub total_depth: u32,
    pub branches: Vec<Branch>,
    pub leaves: Vec<LeafTransform>,
}

impl FractalTree {
    /// Grow a tree from `config` using `seed`
    pub fn generate(config: &TreeConfig, seed: u32) -> Result<Self> {
        config.validate()?;

        let mut builder = Builder {
            config,
            branches: Vec::new(),
            leaves: Vec::with_capacity(1usize << config.total_depth),
        };
        builder.subtree(Vec3::ZERO, Quat::IDENTITY, config.total_depth, SimRng::new(seed));

        log::info!(
            "Generated tree (seed {seed}): {} branches, {} leaves",
            builder.branches.len(),
            builder.leaves.len()
        );

        Ok(Self {
            seed,
            total_depth: config.total_depth,
            branches: builder.branches,
            leaves: builder.leaves,
        })
    }
}

struct Builder<'a> {
    config: &'a TreeConfig,
    branches: Vec<Branch>,
    leaves: Vec<LeafTransform>,
}

impl Builder<'_> {
    // `rng` is taken by value: each child continues from a snapshot of its
    // parent's stream, so sibling subtrees do not perturb each other.
    fn subtree(&mut self, origin: Vec3, rotation: Quat, depth: u32, mut rng: SimRng) {
        let c = self.config;
        let normalized_depth = (depth as f32 + 1.0) / (c.total_depth as f32 + 1.0);
        let trunkness = trunkness(c, depth);

        let mut length_modifier = lerp(1.0, 1.0 + c.trunk_length, trunkness);
        length_modifier += rng.range(-1.0, 1.0) * c.length_variation;

        let dir = rotation * Vec3::Y;
        let dest = origin + dir * c.branch_length * normalized_depth * length_modifier;

        self.branches.push(Branch {
            from: origin,
            to: dest,
            rotation,
            depth,
            trunkness,
        });

        if depth == 0 {
            let normal = dest - origin;
            self.leaves.push(LeafTransform {
                position: dest,
                rotation: look_rotation(normal, Vec3::Y),
                scale: Vec3::splat(rng.range(c.leaf_min_size, c.leaf_max_size)),
            });
            return;
        }

        let common_yaw = Quat::from_axis_angle(Vec3::Y, rng.next_f32() * TAU);

        for i in 0..2 {
            let random_yaw = Quat::from_axis_angle(Vec3::Y, rng.next_f32() * TAU);
            let actual_yaw = common_yaw
                .slerp(random_yaw, c.tangent_variation)
                .slerp(Quat::IDENTITY, c.flatness);
            let tangent = actual_yaw * Vec3::Z;

            let tilt = lerp(c.branch_tilt, rng.next_f32() * c.branch_tilt * 2.0, c.tilt_variation);
            let side = if i == 0 { -1.0 } else { 1.0 };
            let pitch = Quat::from_axis_angle(tangent.normalize_or(Vec3::Z), side * tilt);

            self.subtree(dest, (pitch * rotation).normalize(), depth - 1, rng);
        }
    }
}

/// 1 for trunk levels near the root, 0 for the outer crown
pub(crate) fn trunkness(config: &TreeConfig, depth: u32) -> f32 {
    1.0 - ((config.total_depth as f32 - depth as f32) / config.trunk_depth).clamp(0.0, 1.0)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation whose +Z axis faces `forward` and whose +Y axis leans toward `up`.
///
/// Degenerate inputs (zero forward, forward parallel to up) fall back to a
/// perpendicular reference axis.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or(Vec3::Z);
    let mut x = up.cross(z);
    if x.length_squared() < 1e-12 {
        x = Vec3::X.cross(z);
        if x.length_squared() < 1e-12 {
            x = Vec3::Y.cross(z);
        }
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}
