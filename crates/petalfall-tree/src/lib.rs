//! Petalfall Tree - procedural tree geometry
//!
//! A one-shot recursive builder that produces:
//! - `Branch` segments and `LeafTransform`s from a seeded fractal recursion
//! - a tube mesh for the branches (`TreeMesh`)
//! - the ordered leaf list consumed by the simulation through `GeometryProvider`

mod config;
mod generate;
mod mesh;

pub use config::{TreeConfig, GOOD_SEEDS};
pub use generate::{look_rotation, Branch, FractalTree, LeafTransform};
pub use mesh::{build_branch_mesh, TreeMesh, TreeVertex};

/// Source of the initial leaf transforms the petal store is seeded from
pub trait GeometryProvider {
    /// Ordered leaf transforms; the count fixes the petal population
    fn leaf_transforms(&self) -> Vec<LeafTransform>;
}

impl GeometryProvider for FractalTree {
    fn leaf_transforms(&self) -> Vec<LeafTransform> {
        self.leaves.clone()
    }
}

impl GeometryProvider for Vec<LeafTransform> {
    fn leaf_transforms(&self) -> Vec<LeafTransform> {
        self.clone()
    }
}
