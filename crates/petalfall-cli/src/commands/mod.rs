//! CLI command implementations

pub mod config;
pub mod simulate;
pub mod tree;

use anyhow::{Context, Result};
use petalfall_sim::SimConfig;
use petalfall_tree::TreeConfig;
use std::path::Path;

/// Load a tree config from `path`, or the defaults
pub fn load_tree_config(path: Option<&str>) -> Result<TreeConfig> {
    let Some(path) = path else {
        return Ok(TreeConfig::default());
    };
    let source = std::fs::read_to_string(path).with_context(|| format!("Failed to read tree config '{}'", path))?;
    TreeConfig::from_toml_str(&source).with_context(|| format!("Invalid tree config '{}'", path))
}

/// Load a simulation config from `path`, or the defaults
pub fn load_sim_config(path: Option<&str>) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::load(Path::new(path)).with_context(|| format!("Invalid simulation config '{}'", path)),
        None => Ok(SimConfig::default()),
    }
}

/// A tree seed from the wall clock, for runs without `--seed`
pub fn clock_entropy() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0)
}
