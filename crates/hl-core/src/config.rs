//! Configuration loading
//!
//! Settings live in a TOML file under the platform config directory
//! (`<config>/helios/config.toml`). Every section and key has a default,
//! so a missing or partial file is never fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Log verbosity cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Which physical device the context should pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdapterPreference {
    /// First enumerated device
    #[default]
    First,
    /// First discrete GPU, falling back to the first enumerated device
    Discrete,
}

/// Application identity reported to the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    /// Application version as major/minor/patch
    pub version: [u32; 3],
    /// Target Vulkan API version as major/minor/patch
    pub api_version: [u32; 3],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "helios".to_string(),
            version: [0, 1, 0],
            api_version: [1, 2, 0],
        }
    }
}

/// Graphics context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GfxConfig {
    /// Enable the validation layer and diagnostic callback
    pub validation: bool,
    pub adapter: AdapterPreference,
}

impl Default for GfxConfig {
    fn default() -> Self {
        Self {
            validation: true,
            adapter: AdapterPreference::First,
        }
    }
}

/// Debugging and logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            log_path: PathBuf::from("helios.log"),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub gfx: GfxConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("helios")
            .join("config.toml")
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
