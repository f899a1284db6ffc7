//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Turn timer table setup (names, player count, seconds per turn)
//! - Default tap round length
//! - Sound and vibration switches
//! - Ranking backend selection
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{data_dir, Database};
use crate::error::{ConfigError, CoreError};
use crate::ranking::{LocalRankingStore, RankingStore, RemoteRankingStore};
use crate::tap::TapDuration;
use crate::turn::{MAX_PLAYERS, MIN_PLAYERS};

/// Turn timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConfig {
    #[serde(default = "default_player_names")]
    pub player_names: Vec<String>,
    #[serde(default = "default_player_count")]
    pub player_count: usize,
    #[serde(default = "default_seconds_per_turn")]
    pub seconds_per_turn: u32,
}

/// Tap game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    #[serde(default = "default_tap_duration")]
    pub default_duration: TapDuration,
}

/// Cue output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default = "default_50")]
    pub volume: u32,
    #[serde(default)]
    pub output: SignalOutput,
}

/// Where sound cues go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOutput {
    /// Terminal bell on stderr.
    #[default]
    Bell,
    /// Synthesized tones on the default audio device.
    Audio,
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingBackend {
    Local,
    Remote,
}

/// Ranking storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_backend")]
    pub backend: RankingBackend,
    /// Scoreboard URL; required when `backend = "remote"`.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub turn: TurnConfig,
    #[serde(default)]
    pub tap: TapConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

// Default functions
fn default_player_names() -> Vec<String> {
    (1..=MAX_PLAYERS).map(|i| format!("Player {i}")).collect()
}
fn default_player_count() -> usize {
    2
}
fn default_seconds_per_turn() -> u32 {
    15
}
fn default_tap_duration() -> TapDuration {
    TapDuration::Ten
}
fn default_true() -> bool {
    true
}
fn default_50() -> u32 {
    50
}
fn default_backend() -> RankingBackend {
    RankingBackend::Local
}
fn default_settle_delay_ms() -> u64 {
    500
}
fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            player_names: default_player_names(),
            player_count: default_player_count(),
            seconds_per_turn: default_seconds_per_turn(),
        }
    }
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            default_duration: default_tap_duration(),
        }
    }
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            volume: 50,
            output: SignalOutput::Bell,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: String::new(),
            settle_delay_ms: default_settle_delay_ms(),
            timeout_ms: default_timeout_ms(),
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
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
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
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
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
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.turn.player_count) {
            return Err(invalid(
                "turn.player_count",
                format!("must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            ));
        }
        if self.turn.player_names.len() < self.turn.player_count {
            return Err(invalid(
                "turn.player_names",
                format!("needs at least {} names", self.turn.player_count),
            ));
        }
        if self.turn.seconds_per_turn == 0 {
            return Err(invalid("turn.seconds_per_turn", "must be positive".into()));
        }
        if self.signals.volume > 100 {
            return Err(invalid("signals.volume", "must be 0..=100".into()));
        }
        if self.ranking.backend == RankingBackend::Remote && self.ranking.endpoint.trim().is_empty() {
            return Err(invalid(
                "ranking.endpoint",
                "required when ranking.backend is remote".into(),
            ));
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

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the resulting config is
    /// invalid; `self` is left unchanged in that case.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.update(key, value)?;
        self.save()
    }

    /// Build the configured ranking backend.
    pub fn ranking_store(&self, db: Database) -> Result<Box<dyn RankingStore>, CoreError> {
        self.validate()?;
        match self.ranking.backend {
            RankingBackend::Local => Ok(Box::new(LocalRankingStore::new(db))),
            RankingBackend::Remote => Ok(Box::new(RemoteRankingStore::new(
                self.ranking.endpoint.trim(),
                Duration::from_millis(self.ranking.timeout_ms),
                Duration::from_millis(self.ranking.settle_delay_ms),
            )?)),
        }
    }

    /// Configured player names; a game uses the first `turn.player_count`.
    pub fn roster(&self) -> Vec<String> {
        self.turn.player_names.clone()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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
        assert_eq!(parsed.turn.player_count, 2);
        assert_eq!(parsed.tap.default_duration, TapDuration::Ten);
        assert_eq!(parsed.ranking.backend, RankingBackend::Local);
        assert_eq!(parsed.ranking.settle_delay_ms, 500);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[turn]\nseconds_per_turn = 20\n").unwrap();
        assert_eq!(parsed.turn.seconds_per_turn, 20);
        assert_eq!(parsed.turn.player_names.len(), 4);
        assert!(parsed.signals.sound);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("signals.sound").as_deref(), Some("true"));
        assert_eq!(cfg.get("turn.seconds_per_turn").as_deref(), Some("15"));
        assert_eq!(cfg.get("ranking.backend").as_deref(), Some("local"));
        assert!(cfg.get("signals.missing_key").is_none());
    }

    #[test]
    fn update_changes_typed_values() {
        let mut cfg = Config::default();
        cfg.update("turn.player_count", "4").unwrap();
        cfg.update("signals.vibration", "false").unwrap();
        cfg.update("tap.default_duration", "30").unwrap();
        cfg.update("turn.player_names", r#"["A","B","C","D"]"#).unwrap();
        cfg.update("signals.output", "silent").unwrap();
        assert_eq!(cfg.turn.player_count, 4);
        assert_eq!(cfg.signals.output, SignalOutput::Silent);
        assert!(!cfg.signals.vibration);
        assert_eq!(cfg.tap.default_duration, TapDuration::Thirty);
        assert_eq!(cfg.turn.player_names[3], "D");
    }

    #[test]
    fn update_rejects_bad_values_and_keeps_state() {
        let mut cfg = Config::default();
        assert!(cfg.update("turn.player_count", "9").is_err());
        assert!(cfg.update("tap.default_duration", "7").is_err());
        assert!(cfg.update("signals.sound", "loud").is_err());
        assert!(cfg.update("signals.output", "trumpet").is_err());
        assert!(matches!(
            cfg.update("turn.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.update("ranking.backend", "remote").is_err());
        assert_eq!(cfg.turn.player_count, 2);
        assert_eq!(cfg.ranking.backend, RankingBackend::Local);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.turn.seconds_per_turn, 15);
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[turn]\nplayer_count = 1\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn remote_backend_builds_store() {
        let mut cfg = Config::default();
        cfg.update("ranking.endpoint", "https://scores.example.com/api")
            .unwrap();
        cfg.update("ranking.backend", "remote").unwrap();
        let store = cfg.ranking_store(Database::open_in_memory().unwrap()).unwrap();
        assert_eq!(store.backend(), "remote");
        assert_eq!(store.settle_delay(), Duration::from_millis(500));
    }
}
