//! Engine configuration: Timing and humanization settings loaded from ~/.backbeat/engine.yaml.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine settings. Every field has its own default, so a YAML file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far ahead of the clock each tick schedules, in seconds.
    pub lookahead_secs: f64,
    /// Driver tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Upper bound on timing humanization, in beats.
    pub humanize_ceiling_beats: f64,
    /// Relative velocity jitter while humanization is on.
    pub humanize_velocity: f32,
    pub default_tempo: f64,
    pub default_intensity: f64,
    /// Seed for humanization; cycle `n` of a loop uses `seed + n`.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_secs: 0.1,
            tick_interval_ms: 25,
            humanize_ceiling_beats: 0.02,
            humanize_velocity: 0.1,
            default_tempo: 120.0,
            default_intensity: 1.0,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Standard location: ~/.backbeat/engine.yaml.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".backbeat").join("engine.yaml"))
    }

    /// Load from the standard path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "ignoring engine config");
                Self::default()
            }
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(io_err)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn tick_period_secs(&self) -> f64 {
        self.tick_interval().as_secs_f64()
    }
}
