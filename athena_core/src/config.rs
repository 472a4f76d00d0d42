//! Configuration file support for Athena.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/athena/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workout engine timing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Emit a zero-second rest phase between rounds when a block has no rest
    #[serde(default)]
    pub emit_zero_length_rest: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            emit_zero_length_rest: false,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Biometric monitor simulation and feedback tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    #[serde(default = "default_feedback_cooldown_secs")]
    pub feedback_cooldown_secs: u64,

    #[serde(default = "default_hydration_interval_secs")]
    pub hydration_interval_secs: u64,

    #[serde(default = "default_fatigue_spike_percent")]
    pub fatigue_spike_percent: f64,

    /// Random jitter on simulated readings; off gives reproducible runs
    #[serde(default = "default_jitter")]
    pub jitter: bool,

    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: default_sample_interval_secs(),
            history_capacity: default_history_capacity(),
            trend_window: default_trend_window(),
            feedback_cooldown_secs: default_feedback_cooldown_secs(),
            hydration_interval_secs: default_hydration_interval_secs(),
            fatigue_spike_percent: default_fatigue_spike_percent(),
            jitter: default_jitter(),
            seed: None,
        }
    }
}

impl MonitorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn feedback_cooldown(&self) -> Duration {
        Duration::from_secs(self.feedback_cooldown_secs)
    }

    pub fn hydration_interval(&self) -> Duration {
        Duration::from_secs(self.hydration_interval_secs)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("athena")
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_sample_interval_secs() -> u64 {
    5
}

fn default_history_capacity() -> usize {
    12
}

fn default_trend_window() -> usize {
    3
}

fn default_feedback_cooldown_secs() -> u64 {
    30
}

fn default_hydration_interval_secs() -> u64 {
    10 * 60
}

fn default_fatigue_spike_percent() -> f64 {
    15.0
}

fn default_jitter() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("athena").join("config.toml")
    }

    /// Reject values the engine and monitor cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.tick_interval_ms == 0 {
            return Err(Error::Configuration(
                "engine.tick_interval_ms must be positive".into(),
            ));
        }
        if self.monitor.sample_interval_secs == 0 {
            return Err(Error::Configuration(
                "monitor.sample_interval_secs must be positive".into(),
            ));
        }
        if self.monitor.history_capacity < 2 {
            return Err(Error::Configuration(
                "monitor.history_capacity must be at least 2".into(),
            ));
        }
        if self.monitor.trend_window < 2 || self.monitor.trend_window > self.monitor.history_capacity
        {
            return Err(Error::Configuration(format!(
                "monitor.trend_window must be between 2 and {}",
                self.monitor.history_capacity
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
