//! Tree generation parameters (parsed from TOML)

use petalfall_core::{check_range, PetalError, Result};
use serde::{Deserialize, Serialize};

/// Seeds known to grow well-balanced trees
pub const GOOD_SEEDS: [u32; 8] = [43, 4, 12, 25, 70, 81, 92, 100];

/// Shape parameters for the fractal tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Generation seed. `None` picks one of `GOOD_SEEDS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// Recursion depth; the tree has `2^total_depth` leaves
    pub total_depth: u32,
    pub branch_tilt: f32,
    pub branch_length: f32,
    pub tilt_variation: f32,
    pub tangent_variation: f32,
    pub flatness: f32,
    /// How many levels from the root count as trunk
    pub trunk_depth: f32,
    pub trunk_length: f32,
    pub length_variation: f32,
    pub radius: f32,
    pub trunk_radius: f32,
    pub leaf_min_size: f32,
    pub leaf_max_size: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            total_depth: 11,
            branch_tilt: 0.45,
            branch_length: 1.1,
            tilt_variation: 0.6,
            tangent_variation: 0.7,
            flatness: 0.15,
            trunk_depth: 4.0,
            trunk_length: 2.5,
            length_variation: 0.25,
            radius: 0.12,
            trunk_radius: 2.5,
            leaf_min_size: 0.12,
            leaf_max_size: 0.3,
        }
    }
}

impl TreeConfig {
    /// Parse a config from a TOML string, filling missing fields with defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters outside the ranges the generator is tuned for
    pub fn validate(&self) -> Result<()> {
        if let Some(seed) = self.seed {
            check_range("tree.seed", seed as f32, 1.0, 100.0)?;
        }
        check_range("tree.total_depth", self.total_depth as f32, 0.0, 16.0)?;
        check_range("tree.branch_tilt", self.branch_tilt, 0.0, 1.0)?;
        check_range("tree.branch_length", self.branch_length, 0.0, 2.0)?;
        check_range("tree.tilt_variation", self.tilt_variation, 0.0, 2.0)?;
        check_range("tree.tangent_variation", self.tangent_variation, 0.0, 2.0)?;
        check_range("tree.flatness", self.flatness, 0.0, 1.0)?;
        check_range("tree.trunk_depth", self.trunk_depth, 1.0, 16.0)?;
        check_range("tree.trunk_length", self.trunk_length, 0.0, 10.0)?;
        check_range("tree.length_variation", self.length_variation, 0.0, 2.0)?;
        check_range("tree.radius", self.radius, 0.001, 1.0)?;
        check_range("tree.trunk_radius", self.trunk_radius, 0.0, 10.0)?;
        check_range("tree.leaf_min_size", self.leaf_min_size, 0.0, 1.0)?;
        check_range("tree.leaf_max_size", self.leaf_max_size, 0.0, 2.0)?;
        if self.leaf_min_size > self.leaf_max_size {
            return Err(PetalError::invalid_config(
                "tree.leaf_min_size",
                "must not exceed leaf_max_size",
            ));
        }
        Ok(())
    }

    /// The configured seed, or a good seed picked with `entropy`
    pub fn resolve_seed(&self, entropy: u32) -> u32 {
        self.seed
            .unwrap_or(GOOD_SEEDS[entropy as usize % GOOD_SEEDS.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TreeConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let config = TreeConfig::from_toml_str("seed = 43\ntotal_depth = 4\n").unwrap();
        assert_eq!(config.seed, Some(43));
        assert_eq!(config.total_depth, 4);
        assert_eq!(config.radius, TreeConfig::default().radius);
    }

    #[test]
    fn rejects_inverted_leaf_sizes() {
        let config = TreeConfig {
            leaf_min_size: 0.9,
            leaf_max_size: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_excessive_depth() {
        let result = TreeConfig::from_toml_str("total_depth = 40");
        assert!(matches!(result, Err(PetalError::ValueOutOfRange { .. })));
    }

    #[test]
    fn resolve_seed_prefers_configured() {
        let config = TreeConfig {
            seed: Some(7),
            ..Default::default()
        };
        assert_eq!(config.resolve_seed(3), 7);
        assert!(GOOD_SEEDS.contains(&TreeConfig::default().resolve_seed(12345)));
    }
}
