//! Engine configuration.
//!
//! Loaded from TOML. Missing files fall back to defaults; present files
//! are validated before use.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::metrics::w_prime::WPrimeAlgorithm;
use crate::models::series::{CADENCE, DISTANCE, HEARTRATE, POWER, TIME};

/// Inclusive bounds for a column's values. `None` leaves a side open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ColumnBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }
}

/// Rules applied by the series validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Required name of the index
    pub index_name: String,
    /// Required step between consecutive index labels, in seconds
    pub sample_step: i64,
    /// Per-column value bounds. Columns listed in a config file replace
    /// the default for that column only; the other defaults stay in force.
    /// An empty table (`[validation.bounds.heartrate]`) leaves a column
    /// unchecked.
    #[serde(deserialize_with = "merge_default_bounds")]
    pub bounds: BTreeMap<String, ColumnBounds>,
}

fn default_bounds() -> BTreeMap<String, ColumnBounds> {
    let mut bounds = BTreeMap::new();
    bounds.insert(HEARTRATE.to_string(), ColumnBounds::at_least(0.0));
    bounds.insert(POWER.to_string(), ColumnBounds::between(0.0, 3000.0));
    bounds.insert(CADENCE.to_string(), ColumnBounds::at_least(0.0));
    bounds.insert(DISTANCE.to_string(), ColumnBounds::at_least(0.0));
    bounds
}

fn merge_default_bounds<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ColumnBounds>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let configured = BTreeMap::<String, ColumnBounds>::deserialize(deserializer)?;
    let mut bounds = default_bounds();
    bounds.extend(configured);
    Ok(bounds)
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            index_name: TIME.to_string(),
            sample_step: 1,
            bounds: default_bounds(),
        }
    }
}

/// Power curve settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    /// Rolling window for normalized power, in samples
    pub normalized_power_window: usize,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            normalized_power_window: 30,
        }
    }
}

/// Fatigue model settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueSettings {
    /// Algorithm used when none is requested explicitly
    pub default_algorithm: WPrimeAlgorithm,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub validation: ValidationSettings,
    pub power: PowerSettings,
    pub fatigue: FatigueSettings,
}

impl AnalyticsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyticsConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.power.normalized_power_window == 0 {
            return Err(ConfigError::Invalid(
                "power.normalized_power_window must be at least 1".to_string(),
            ));
        }
        if self.validation.sample_step < 1 {
            return Err(ConfigError::Invalid(
                "validation.sample_step must be at least 1".to_string(),
            ));
        }
        for (column, bounds) in &self.validation.bounds {
            if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                if min > max {
                    return Err(ConfigError::Invalid(format!(
                        "bounds for '{}' have min {} > max {}",
                        column, min, max
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load configuration from `path`, or defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<AnalyticsConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AnalyticsConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    let config = AnalyticsConfig::from_toml_str(&content)?;

    tracing::info!("Loaded analytics config from {}", path.display());
    Ok(config)
}

/// Save configuration to `path`.
pub fn save_config(path: &Path, config: &AnalyticsConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = config.to_toml_string()?;
    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}
