//! TOML-based game configuration.
//!
//! Stores the tunable session constants:
//! - Round length and scoring table
//! - Daily explanation quota
//! - Fact ordering policy and content location
//!
//! Configuration is stored at `~/.config/truedose/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::facts::FactOrder;
use crate::scoring::{ScoringRules, SpeedBonusTier};

/// Seconds on the clock at the start of every round.
pub const ROUND_SECONDS: u32 = 15;
/// Free explanation reveals per local calendar day.
pub const DAILY_EXPLANATION_LIMIT: u32 = 5;
/// Points for a correct answer before the speed bonus.
pub const BASE_CORRECT_POINTS: u32 = 100;
/// `{>10s: 50, >5s: 25, else: 0}`
pub const DEFAULT_SPEED_BONUS_TIERS: [SpeedBonusTier; 2] = [
    SpeedBonusTier {
        above_secs: 10,
        points: 50,
    },
    SpeedBonusTier {
        above_secs: 5,
        points: 25,
    },
];

/// Round timing and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    #[serde(default = "default_base_points")]
    pub base_correct_points: u32,
    #[serde(default = "default_speed_bonus")]
    pub speed_bonus: Vec<SpeedBonusTier>,
}

/// Explanation quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_explanation_limit: u32,
}

/// Where facts come from and in which order they are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentConfig {
    #[serde(default)]
    pub order: FactOrder,
    /// Seed for shuffled decks; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON fact file; the bundled deck is used when unset.
    #[serde(default)]
    pub facts_path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/truedose/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub round: RoundConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

fn default_round_seconds() -> u32 {
    ROUND_SECONDS
}
fn default_base_points() -> u32 {
    BASE_CORRECT_POINTS
}
fn default_speed_bonus() -> Vec<SpeedBonusTier> {
    DEFAULT_SPEED_BONUS_TIERS.to_vec()
}
fn default_daily_limit() -> u32 {
    DAILY_EXPLANATION_LIMIT
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_seconds: default_round_seconds(),
            base_correct_points: default_base_points(),
            speed_bonus: default_speed_bonus(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_explanation_limit: default_daily_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                continue;
            }

            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Unset optionals: numbers stay numbers, "none" clears.
                serde_json::Value::Null => match value.parse::<u64>() {
                    Ok(n) => serde_json::Value::Number(n.into()),
                    Err(_) if value == "none" => serde_json::Value::Null,
                    Err(_) => serde_json::Value::String(value.into()),
                },
                serde_json::Value::String(_) if value == "none" => serde_json::Value::Null,
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Check that the constants describe a playable round.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round.round_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "round.round_seconds".into(),
                message: "must be at least 1".into(),
            });
        }
        if let Some(tier) = self
            .round
            .speed_bonus
            .iter()
            .find(|t| t.above_secs >= self.round.round_seconds)
        {
            return Err(ConfigError::InvalidValue {
                key: "round.speed_bonus".into(),
                message: format!(
                    "threshold {}s can never be exceeded in a {}s round",
                    tier.above_secs, self.round.round_seconds
                ),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The change is validated but not
    /// saved; call [`Config::save`] afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules::new(self.round.base_correct_points, self.round.speed_bonus.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.round.round_seconds, 15);
        assert_eq!(parsed.quota.daily_explanation_limit, 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[round]\nround_seconds = 20\n").unwrap();
        assert_eq!(parsed.round.round_seconds, 20);
        assert_eq!(parsed.round.base_correct_points, 100);
        assert_eq!(parsed.content.order, FactOrder::Sequential);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("round.round_seconds").as_deref(), Some("15"));
        assert_eq!(cfg.get("content.order").as_deref(), Some("sequential"));
        assert!(cfg.get("round.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_enum() {
        let mut cfg = Config::default();
        cfg.set("quota.daily_explanation_limit", "3").unwrap();
        cfg.set("content.order", "shuffled").unwrap();
        cfg.set("content.seed", "42").unwrap();
        assert_eq!(cfg.quota.daily_explanation_limit, 3);
        assert_eq!(cfg.content.order, FactOrder::Shuffled);
        assert_eq!(cfg.content.seed, Some(42));

        cfg.set("content.seed", "none").unwrap();
        assert_eq!(cfg.content.seed, None);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("round.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("round.round_seconds", "fast").is_err());
        assert!(cfg.set("round.round_seconds", "0").is_err());
        assert!(cfg.set("content.order", "alphabetical").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_rejects_unreachable_bonus_tier() {
        let mut cfg = Config::default();
        cfg.round.round_seconds = 8;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.round.round_seconds = 30;
        cfg.content.facts_path = Some("/tmp/facts.json".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn scoring_rules_follow_config() {
        let mut cfg = Config::default();
        cfg.round.base_correct_points = 10;
        assert_eq!(cfg.scoring_rules().round_score(true, 12), 60);
    }
}
