//! TOML-based application configuration.
//!
//! Stores user preferences for the engine:
//! - Weight profile selection (or fully custom weights)
//! - Engine tunables (horizon, decay rate, urgency floor, override window)
//! - Context defaults applied when the caller supplies nothing
//!
//! Configuration is stored at `~/.config/nextup/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::decay::DecayConfig;
use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::scoring::FactorWeights;

/// Weight selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Named preset profile
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Custom weights; when set, takes precedence over `profile`
    #[serde(default)]
    pub custom: Option<FactorWeights>,
}

/// Engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_horizon_days")]
    pub horizon_days: f64,
    #[serde(default = "default_decay_rate")]
    pub decay_rate_per_day: f64,
    #[serde(default = "default_urgency_floor")]
    pub urgency_floor: f64,
    #[serde(default = "default_override_hours")]
    pub deadline_override_hours: f64,
}

/// Context defaults used when the caller provides no value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDefaults {
    /// Assumed available minutes when no slot is given
    #[serde(default)]
    pub available_minutes: Option<u32>,
    /// Assumed current energy (1-10)
    #[serde(default = "default_energy")]
    pub energy: u8,
    /// Default focus label
    #[serde(default)]
    pub focus_label: Option<String>,
    /// How many days of completion history feed momentum
    #[serde(default = "default_completion_window_days")]
    pub completion_window_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/nextup/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub context: ContextDefaults,
}

// Default functions
fn default_profile() -> String {
    "balanced".into()
}
fn default_horizon_days() -> f64 {
    14.0
}
fn default_decay_rate() -> f64 {
    0.05
}
fn default_urgency_floor() -> f64 {
    10.0
}
fn default_override_hours() -> f64 {
    48.0
}
fn default_energy() -> u8 {
    5
}
fn default_completion_window_days() -> u32 {
    7
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            custom: None,
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            decay_rate_per_day: default_decay_rate(),
            urgency_floor: default_urgency_floor(),
            deadline_override_hours: default_override_hours(),
        }
    }
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            available_minutes: None,
            energy: default_energy(),
            focus_label: None,
            completion_window_days: default_completion_window_days(),
        }
    }
}

impl Config {
    /// Path to the config file in the standard data directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/nextup"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the standard location, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save to the standard location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the effective weight vector (custom wins over profile).
    ///
    /// The result is not yet validated; engine construction does that.
    pub fn resolve_weights(&self) -> Result<FactorWeights, ConfigError> {
        if let Some(custom) = self.weights.custom {
            return Ok(custom);
        }
        FactorWeights::preset(&self.weights.profile).ok_or_else(|| ConfigError::InvalidValue {
            key: "weights.profile".into(),
            message: format!(
                "unknown profile '{}' (available: {})",
                self.weights.profile,
                FactorWeights::preset_names().join(", ")
            ),
        })
    }

    /// Engine tunables as pipeline configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            horizon_days: self.engine.horizon_days,
            decay: DecayConfig {
                rate_per_day: self.engine.decay_rate_per_day,
                floor: self.engine.urgency_floor,
                override_hours: self.engine.deadline_override_hours,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_resolves_balanced() {
        let config = Config::default();
        let weights = config.resolve_weights().unwrap();
        assert_eq!(weights, FactorWeights::balanced());
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let mut config = Config::default();
        config.weights.profile = "eisenhower".into();
        let err = config.resolve_weights().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("eisenhower"));
    }

    #[test]
    fn test_custom_weights_win_over_profile() {
        let mut config = Config::default();
        config.weights.profile = "balanced".into();
        config.weights.custom = Some(FactorWeights::deep_work());
        assert_eq!(config.resolve_weights().unwrap(), FactorWeights::deep_work());
    }

    #[test]
    fn test_roundtrip_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.weights.profile = "deadline_focused".into();
        config.engine.decay_rate_per_day = 0.1;
        config.context.available_minutes = Some(90);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.weights.profile, "deadline_focused");
        assert_eq!(loaded.engine.decay_rate_per_day, 0.1);
        assert_eq!(loaded.context.available_minutes, Some(90));
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: Config = toml::from_str("[weights]\nprofile = \"quick_wins\"\n").unwrap();
        assert_eq!(config.weights.profile, "quick_wins");
        assert_eq!(config.engine.horizon_days, 14.0);
        assert_eq!(config.context.energy, 5);
    }
}
