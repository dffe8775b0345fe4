/// Mapping configuration
///
/// Loaded from YAML or JSON, either as a string (the WASM surface passes
/// JSON) or from a file. Every field has a default, so an empty document is
/// a valid configuration.

use crate::rational::{default_grid_unit, Rational};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YAML configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which neighbouring chord an ornamental run is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentDirection {
    /// The chord following the run
    #[default]
    Forward,
    /// The chord preceding the run
    Backward,
}

/// Durations reported for mapped notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationMode {
    /// The tablature's minimum duration
    #[default]
    AsMatched,
    /// Extended to the next onset in the note's voice, capped at the bar end
    CompletedToBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MappingConfig {
    #[serde(alias = "include_ornamentation")]
    pub include_ornamentation: bool,
    #[serde(alias = "ornament_direction")]
    pub ornament_direction: OrnamentDirection,
    #[serde(alias = "duration_mode")]
    pub duration_mode: DurationMode,
    /// Smallest rhythmic unit, as `[numerator, denominator]`
    #[serde(alias = "grid_unit")]
    pub grid_unit: Rational,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            include_ornamentation: true,
            ornament_direction: OrnamentDirection::Forward,
            duration_mode: DurationMode::AsMatched,
            grid_unit: default_grid_unit(),
        }
    }
}

impl MappingConfig {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: MappingConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: MappingConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        log::debug!("loading mapping configuration from {}", path.display());
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = self.grid_unit;
        if unit <= Rational::from_integer(0) || unit > Rational::from_integer(1) {
            return Err(ConfigError::Invalid(format!(
                "grid unit must lie in (0, 1], got {}",
                unit
            )));
        }
        Ok(())
    }
}
