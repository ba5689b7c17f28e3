//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Attendant message cadence and source
//! - Reward rules for business flights
//! - History capacity
//! - Defaults for class and seat
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use super::history::DEFAULT_CAPACITY;
use crate::error::ConfigError;
use crate::messages::{HttpMessageSource, LocalMessageSource, MessageSource};
use crate::scheduler::Cadence;
use crate::session::FlightClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Local,
    Http,
}

/// Attendant message configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_first_delay")]
    pub first_delay_secs: u64,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_display")]
    pub display_secs: u64,
    #[serde(default)]
    pub source: SourceKind,
    /// Endpoint used when `source = "http"`.
    #[serde(default = "default_http_url")]
    pub http_url: String,
    /// Upper bound on one remote request. The tick waits this long at most.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,
    /// Fixed RNG seed for the local table. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Business flight reward rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_initial_credits")]
    pub initial_business_credits: u32,
    #[serde(default = "default_reward_threshold")]
    pub business_reward_threshold_min: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Values used when the CLI is not told otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub flight_class: FlightClass,
    #[serde(default = "default_seat")]
    pub seat: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

// Default functions
fn default_first_delay() -> u64 {
    30
}
fn default_interval() -> u64 {
    300
}
fn default_display() -> u64 {
    4
}
fn default_http_url() -> String {
    "http://localhost:3000/api/flight-attendant-message".into()
}
fn default_http_timeout() -> u64 {
    800
}
fn default_initial_credits() -> u32 {
    5
}
fn default_reward_threshold() -> u32 {
    45
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_seat() -> String {
    "A1".into()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            first_delay_secs: default_first_delay(),
            interval_secs: default_interval(),
            display_secs: default_display(),
            source: SourceKind::Local,
            http_url: default_http_url(),
            http_timeout_ms: default_http_timeout(),
            seed: None,
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            initial_business_credits: default_initial_credits(),
            business_reward_threshold_min: default_reward_threshold(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            flight_class: FlightClass::Economy,
            seat: default_seat(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse::<bool>().map_err(|e| invalid(e.to_string()))?)
            }
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            // Optional fields serialize as null; "none" clears them again.
            serde_json::Value::Null => match value {
                "" | "none" => serde_json::Value::Null,
                _ => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .unwrap_or_else(|_| serde_json::Value::String(value.into())),
            },
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
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

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if updated.history.capacity < 1 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "history capacity must be at least 1".into(),
            });
        }
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    pub fn cadence(&self) -> Cadence {
        Cadence {
            first_delay_secs: self.messages.first_delay_secs,
            interval_secs: self.messages.interval_secs,
            display_secs: self.messages.display_secs,
        }
    }

    /// Build the configured message source.
    ///
    /// A bad HTTP endpoint falls back to the local table.
    pub fn message_source(&self) -> Box<dyn MessageSource> {
        let local = || -> Box<dyn MessageSource> {
            match self.messages.seed {
                Some(seed) => Box::new(LocalMessageSource::seeded(seed)),
                None => Box::new(LocalMessageSource::new()),
            }
        };
        match self.messages.source {
            SourceKind::Local => local(),
            SourceKind::Http => match HttpMessageSource::with_timeout(
                &self.messages.http_url,
                Duration::from_millis(self.messages.http_timeout_ms),
            ) {
                Ok(source) => Box::new(source),
                Err(e) => {
                    warn!(error = %e, url = %self.messages.http_url, "falling back to local messages");
                    local()
                }
            },
        }
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
        assert_eq!(parsed.messages.interval_secs, 300);
        assert_eq!(parsed.rewards.initial_business_credits, 5);
        assert_eq!(parsed.history.capacity, 50);
        assert_eq!(parsed.messages.http_timeout_ms, 800);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[messages]\ninterval_secs = 60\n").unwrap();
        assert_eq!(parsed.messages.interval_secs, 60);
        assert_eq!(parsed.messages.first_delay_secs, 30);
        assert_eq!(parsed.rewards.business_reward_threshold_min, 45);
        assert_eq!(parsed.defaults.seat, "A1");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("messages.display_secs").as_deref(), Some("4"));
        assert_eq!(cfg.get("messages.source").as_deref(), Some("local"));
        assert_eq!(cfg.get("defaults.flight_class").as_deref(), Some("economy"));
        assert!(cfg.get("messages.missing_key").is_none());
    }

    #[test]
    fn apply_updates_numbers_and_enums() {
        let mut cfg = Config::default();
        cfg.apply("messages.interval_secs", "120").unwrap();
        cfg.apply("messages.source", "http").unwrap();
        cfg.apply("defaults.flight_class", "business").unwrap();
        assert_eq!(cfg.messages.interval_secs, 120);
        assert_eq!(cfg.messages.source, SourceKind::Http);
        assert_eq!(cfg.defaults.flight_class, FlightClass::Business);
    }

    #[test]
    fn apply_sets_and_clears_optional_seed() {
        let mut cfg = Config::default();
        cfg.apply("messages.seed", "42").unwrap();
        assert_eq!(cfg.messages.seed, Some(42));
        cfg.apply("messages.seed", "none").unwrap();
        assert_eq!(cfg.messages.seed, None);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("messages.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("nope", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("history.capacity", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("messages.source", "carrier-pigeon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.history.capacity, 50);
        assert_eq!(cfg.messages.source, SourceKind::Local);
    }

    #[test]
    fn apply_rejects_zero_history_capacity() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("history.capacity", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.history.capacity, 50);
        cfg.apply("history.capacity", "1").unwrap();
        assert_eq!(cfg.history.capacity, 1);
    }

    #[test]
    fn cadence_reflects_messages_section() {
        let mut cfg = Config::default();
        cfg.messages.first_delay_secs = 5;
        assert_eq!(
            cfg.cadence(),
            Cadence {
                first_delay_secs: 5,
                interval_secs: 300,
                display_secs: 4
            }
        );
    }
}
