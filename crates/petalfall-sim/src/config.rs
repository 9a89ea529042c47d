//! Simulation configuration (parsed from TOML)
//!
//! Every section has defaults, so a config file only needs the values it
//! changes. `validate` runs on every load and on simulation construction;
//! out-of-range values are rejected rather than clamped.

use petalfall_audio::AudioSettings;
use petalfall_core::{check_range, PetalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wind model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Prevailing wind direction; normalized on use
    pub base_direction: [f32; 3],
    /// Angular spread of re-randomized targets, as a fraction of π
    pub direction_variation: f32,
    /// Per-second chance of picking a new direction target
    pub direction_probability: f32,
    /// Smoothing reach time toward the direction target (seconds)
    pub direction_reach_time: f32,
    pub force_base: f32,
    pub force_variation: f32,
    /// Per-second chance of picking a new force target
    pub force_probability: f32,
    /// Smoothing reach time toward the force target (seconds)
    pub force_reach_time: f32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            base_direction: [0.0, 0.0, 1.0],
            direction_variation: 0.35,
            direction_probability: 0.25,
            direction_reach_time: 0.8,
            force_base: 0.01,
            force_variation: 0.03,
            force_probability: 0.3,
            force_reach_time: 3.0,
        }
    }
}

/// Petal physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetalConfig {
    /// Downward acceleration applied to per-step velocity
    pub gravity: f32,
    /// Petals released per second
    pub fall_rate: f32,
    /// Spin picked up from the wind, degrees per unit wind per second
    pub rotation_force: f32,
    /// Fraction of rolling velocity left after one second on the ground
    pub ground_smoothing: f32,
    /// Squared speed below which a grounded petal counts as settled
    pub rolling_epsilon: f32,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            gravity: 0.08,
            fall_rate: 40.0,
            rotation_force: 1.0,
            ground_smoothing: 0.001,
            rolling_epsilon: 0.001,
        }
    }
}

/// Grounded-petal lift-off parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiseConfig {
    /// Petals closer than this to the reference point lift off
    pub radius: f32,
    /// Horizontal push away from the reference point (per step)
    pub speed: f32,
    /// Upward velocity given on lift-off (per step)
    pub lift: f32,
    /// Height added on lift-off so the petal is off the ground
    pub nudge: f32,
    /// Minimum seconds between two rising cues
    pub cue_interval: f32,
}

impl Default for RiseConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            speed: 0.05,
            lift: 0.05,
            nudge: 0.001,
            cue_interval: 0.15,
        }
    }
}

/// End-of-simulation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Seconds between the last detachment and the shutdown request
    pub close_delay: f32,
    /// Fade duration handed to the host with the shutdown request
    pub fade_seconds: f32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            close_delay: 15.0,
            fade_seconds: 5.0,
        }
    }
}

/// Top-level simulation config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub wind: WindConfig,
    pub petals: PetalConfig,
    pub rise: RiseConfig,
    pub audio: AudioSettings,
    pub lifecycle: LifecycleConfig,
}

impl SimConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.wind;
        let [x, y, z] = w.base_direction;
        if !(x * x + y * y + z * z).is_normal() {
            return Err(PetalError::invalid_config(
                "wind.base_direction",
                "must be a finite, non-zero vector",
            ));
        }
        check_range("wind.direction_variation", w.direction_variation, 0.0, 1.0)?;
        check_range("wind.direction_probability", w.direction_probability, 0.0, 1.0)?;
        check_range("wind.direction_reach_time", w.direction_reach_time, 0.0, 10.0)?;
        check_range("wind.force_base", w.force_base, 0.0, 1.0)?;
        check_range("wind.force_variation", w.force_variation, 0.0, 1.0)?;
        check_range("wind.force_probability", w.force_probability, 0.0, 1.0)?;
        check_range("wind.force_reach_time", w.force_reach_time, 0.0, 10.0)?;
        if w.force_base + w.force_variation <= 0.0 {
            return Err(PetalError::invalid_config(
                "wind.force_base",
                "force_base + force_variation must be positive",
            ));
        }

        let p = &self.petals;
        check_range("petals.gravity", p.gravity, 0.0, 1.0)?;
        check_range("petals.fall_rate", p.fall_rate, 0.0, 9999.0)?;
        if p.fall_rate <= 0.0 {
            return Err(PetalError::invalid_config(
                "petals.fall_rate",
                "must be greater than zero",
            ));
        }
        check_range("petals.rotation_force", p.rotation_force, 0.0, 2.0)?;
        check_range("petals.ground_smoothing", p.ground_smoothing, 0.0, 1.0)?;
        check_range("petals.rolling_epsilon", p.rolling_epsilon, 0.0, 1.0)?;

        let r = &self.rise;
        check_range("rise.radius", r.radius, 0.0, 1000.0)?;
        check_range("rise.speed", r.speed, 0.0, 10.0)?;
        check_range("rise.lift", r.lift, 0.0, 10.0)?;
        check_range("rise.nudge", r.nudge, f32::MIN_POSITIVE, 1.0)?;
        check_range("rise.cue_interval", r.cue_interval, 0.0, 60.0)?;

        check_range("lifecycle.close_delay", self.lifecycle.close_delay, 0.0, 3600.0)?;
        check_range("lifecycle.fade_seconds", self.lifecycle.fade_seconds, 0.0, 60.0)?;

        self.audio.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.petals.fall_rate > 0.0);
        assert_eq!(config.rise.cue_interval, 0.15);
    }

    #[test]
    fn parse_partial_toml() {
        let source = r#"
[wind]
force_base = 0.2
base_direction = [1, 0, 0]

[petals]
fall_rate = 2.0

[audio]
voice_capacity = 8
"#;
        let config = SimConfig::from_toml_str(source).unwrap();
        assert!((config.wind.force_base - 0.2).abs() < 1e-6);
        assert_eq!(config.wind.base_direction, [1.0, 0.0, 0.0]);
        assert_eq!(config.petals.fall_rate, 2.0);
        assert_eq!(config.audio.voice_capacity, 8);
        assert_eq!(config.rise, RiseConfig::default());
    }

    #[test]
    fn negative_fall_rate_fails_fast() {
        let result = SimConfig::from_toml_str("[petals]\nfall_rate = -1.0");
        assert!(matches!(result, Err(PetalError::ValueOutOfRange { .. })));
    }

    #[test]
    fn zero_fall_rate_is_rejected() {
        let result = SimConfig::from_toml_str("[petals]\nfall_rate = 0.0");
        assert!(matches!(result, Err(PetalError::InvalidConfig { .. })));
    }

    #[test]
    fn zero_wind_direction_is_rejected() {
        let result = SimConfig::from_toml_str("[wind]\nbase_direction = [0, 0, 0]");
        assert!(result.is_err());
    }

    #[test]
    fn zero_voice_capacity_is_rejected() {
        let result = SimConfig::from_toml_str("[audio]\nvoice_capacity = 0");
        assert!(matches!(result, Err(PetalError::InvalidConfig { .. })));
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = SimConfig::default();
        config.petals.gravity = 0.3;
        let text = config.to_toml_string().unwrap();
        assert_eq!(SimConfig::from_toml_str(&text).unwrap(), config);
    }
}
