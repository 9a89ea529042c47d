//! Tube mesh for tree branches

use crate::config::TreeConfig;
use crate::generate::{lerp, trunkness, FractalTree};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::TAU;

/// Branch vertex: position, normal and bendability (0 at the trunk base,
/// approaching 1 at the twigs) used by the wind bend in the vertex shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TreeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub bendability: f32,
}

/// Triangle-list mesh with 32-bit indices
#[derive(Debug, Clone, Default)]
pub struct TreeMesh {
    pub vertices: Vec<TreeVertex>,
    pub indices: Vec<u32>,
}

impl TreeMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build an open tube per branch, tapering from base to top radius.
///
/// Each ring has 4 to 7 segments depending on depth; thicker trunk levels
/// are widened by `trunk_radius`.
pub fn build_branch_mesh(tree: &FractalTree, config: &TreeConfig) -> TreeMesh {
    let mut mesh = TreeMesh::default();
    let levels = tree.total_depth as f32 + 1.0;

    for branch in &tree.branches {
        let base_depth = (branch.depth as f32 + 1.0) / levels;
        let top_depth = (branch.depth as f32 / levels).max(0.001);

        let base_trunk = trunkness(config, branch.depth);
        // One level up from the base; wraps to the trunk value at depth 0
        let top_trunk = 1.0
            - ((config.total_depth as f32 - (branch.depth as f32 - 1.0)) / config.trunk_depth)
                .clamp(0.0, 1.0);

        let base_radius = config.radius * base_depth * lerp(1.0, 1.0 + config.trunk_radius, base_trunk);
        let top_radius = config.radius * top_depth * lerp(1.0, 1.0 + config.trunk_radius, top_trunk);

        let segments = lerp(4.0, 7.0, base_depth).round() as u32;
        let first = mesh.vertices.len() as u32;

        for j in 0..segments {
            let angle = j as f32 / segments as f32 * TAU;
            let ring = Vec3::new(angle.cos(), 0.0, angle.sin());

            let offset = branch.rotation * (ring * base_radius);
            mesh.vertices.push(TreeVertex {
                position: (branch.from + offset).to_array(),
                normal: offset.normalize_or_zero().to_array(),
                bendability: 1.0 - base_depth,
            });

            let offset = branch.rotation * (ring * top_radius);
            mesh.vertices.push(TreeVertex {
                position: (branch.to + offset).to_array(),
                normal: offset.normalize_or_zero().to_array(),
                bendability: 1.0 - top_depth,
            });
        }

        let range = segments * 2;
        let wrap = |offset: u32| first + offset % range;
        for j in (0..range).step_by(2) {
            mesh.indices
                .extend_from_slice(&[wrap(j), wrap(j + 1), wrap(j + 2)]);
            mesh.indices
                .extend_from_slice(&[wrap(j + 2), wrap(j + 1), wrap(j + 3)]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_indices_stay_in_bounds() {
        let config = TreeConfig {
            total_depth: 4,
            ..Default::default()
        };
        let tree = FractalTree::generate(&config, 43).unwrap();
        let mesh = build_branch_mesh(&tree, &config);

        assert!(!mesh.vertices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn segments_per_branch_between_four_and_seven() {
        let config = TreeConfig {
            total_depth: 3,
            ..Default::default()
        };
        let tree = FractalTree::generate(&config, 12).unwrap();
        let mesh = build_branch_mesh(&tree, &config);
        let per_branch = mesh.vertices.len() / tree.branches.len();
        assert!((8..=14).contains(&per_branch));
        // Two triangles per segment
        let vertex_pairs = mesh.vertices.len() / 2;
        assert_eq!(mesh.triangle_count(), vertex_pairs * 2);
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<TreeVertex>(), 28);
    }
}
