//! Configuration file support for Replog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/replog/config.toml`.

use crate::{Error, Result, RestTimerKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub rest: RestConfig,
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

/// Rest timer preferences
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestConfig {
    /// Rest after main lifts, in seconds
    #[serde(default = "default_primary_seconds")]
    pub primary_seconds: u32,

    /// Rest after accessory work, in seconds
    #[serde(default = "default_secondary_seconds")]
    pub secondary_seconds: u32,

    /// Start the rest timer automatically when a set is logged
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            primary_seconds: default_primary_seconds(),
            secondary_seconds: default_secondary_seconds(),
            auto_start: default_auto_start(),
        }
    }
}

impl RestConfig {
    /// Configured rest duration for the given timer kind
    pub fn duration_seconds(&self, kind: RestTimerKind) -> u32 {
        match kind {
            RestTimerKind::Primary => self.primary_seconds,
            RestTimerKind::Secondary => self.secondary_seconds,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("replog")
}

fn default_primary_seconds() -> u32 {
    180
}

fn default_secondary_seconds() -> u32 {
    90
}

fn default_auto_start() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
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

    fn validate(&self) -> Result<()> {
        if self.rest.primary_seconds == 0 || self.rest.secondary_seconds == 0 {
            return Err(Error::Config(
                "rest durations must be positive seconds".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("replog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
