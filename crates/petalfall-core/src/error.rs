//! Error types for Petalfall

use thiserror::Error;

/// The main error type for Petalfall operations
#[derive(Debug, Error)]
pub enum PetalError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Pool error: {0}")]
    PoolError(String),

    #[error("Pool exhausted: capacity ceiling of {ceiling} reached")]
    PoolExhausted { ceiling: usize },

    #[error("Geometry error: {0}")]
    GeometryError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl PetalError {
    /// Shorthand for an `InvalidConfig` error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PetalError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Petalfall operations
pub type Result<T> = std::result::Result<T, PetalError>;

impl From<toml::de::Error> for PetalError {
    fn from(err: toml::de::Error) -> Self {
        PetalError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for PetalError {
    fn from(err: toml::ser::Error) -> Self {
        PetalError::TomlSerError(err.to_string())
    }
}

/// Ensure `value` lies within `[min, max]`, failing with `ValueOutOfRange` otherwise.
///
/// NaN never passes.
pub fn check_range(field: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(PetalError::ValueOutOfRange {
            field: field.to_string(),
            min: min as f64,
            max: max as f64,
            value: value as f64,
        })
    }
}
