//! Tree statistics command

use super::{clock_entropy, load_tree_config};
use anyhow::{Context, Result};
use petalfall_tree::{build_branch_mesh, FractalTree};

pub fn run(config_path: Option<&str>, seed: Option<u32>) -> Result<()> {
    let config = load_tree_config(config_path)?;
    let seed = seed.unwrap_or_else(|| config.resolve_seed(clock_entropy()));

    let tree = FractalTree::generate(&config, seed).context("Failed to generate tree")?;
    let mesh = build_branch_mesh(&tree, &config);

    let (min, max) = tree.leaves.iter().fold(
        (glam::Vec3::splat(f32::MAX), glam::Vec3::splat(f32::MIN)),
        |(min, max), leaf| (min.min(leaf.position), max.max(leaf.position)),
    );

    println!("Tree (seed {})", tree.seed);
    println!("  Depth:     {}", tree.total_depth);
    println!("  Branches:  {}", tree.branches.len());
    println!("  Leaves:    {}", tree.leaves.len());
    println!("  Vertices:  {}", mesh.vertices.len());
    println!("  Triangles: {}", mesh.triangle_count());
    if !tree.leaves.is_empty() {
        println!(
            "  Crown:     ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    Ok(())
}
