//! Configuration management for Timing TestKit
//!
//! Provides persistent configuration that is automatically saved to and loaded
//! from a platform-specific config file.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/timing-testkit/config.toml` |
//! | macOS | `~/Library/Application Support/timing-testkit/config.toml` |
//! | Windows | `%APPDATA%\timing-testkit\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use timing_testkit::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Modify settings
//! config.trial.max_secs = 3.0;
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Directory name used under the platform config/data/document dirs
pub const APP_DIR_NAME: &str = "timing-testkit";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join(APP_DIR_NAME);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target exposure range for active and passive trials
    pub trial: TrialConfig,
    /// Passive test estimate control
    pub passive: PassiveConfig,
    /// "Get ready" countdown before a test starts
    #[serde(default)]
    pub countdown: CountdownConfig,
    /// Where results and exports live
    #[serde(default)]
    pub storage: StorageConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Trial generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Shortest target exposure in seconds
    pub min_secs: f64,
    /// Longest target exposure in seconds
    pub max_secs: f64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 5.0,
        }
    }
}

/// Unit in which typed passive estimates are interpreted.
///
/// Stored estimates are always milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InputUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl InputUnit {
    /// Multiplier that converts a typed value into milliseconds
    pub fn to_ms_factor(self) -> f64 {
        match self {
            InputUnit::Milliseconds => 1.0,
            InputUnit::Seconds => 1000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            InputUnit::Milliseconds => "ms",
            InputUnit::Seconds => "s",
        }
    }
}

/// Passive test estimate control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveConfig {
    /// Slider lower bound in ms (also the initial value)
    pub slider_min_ms: u64,
    /// Slider upper bound in ms
    pub slider_max_ms: u64,
    /// Slider step in ms
    pub step_ms: u64,
    /// Unit used when the estimate is typed
    #[serde(default)]
    pub input_unit: InputUnit,
}

impl Default for PassiveConfig {
    fn default() -> Self {
        Self {
            slider_min_ms: 1000,
            slider_max_ms: 5000,
            step_ms: 100,
            input_unit: InputUnit::Milliseconds,
        }
    }
}

/// Countdown overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    pub enabled: bool,
    pub seconds: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds: 3,
        }
    }
}

/// Storage location overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory holding the JSON result files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Directory receiving CSV exports
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved data directory, falling back to the platform data dir
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR_NAME)))
    }

    /// Resolved export directory: override, documents dir, then data dir
    pub fn resolved_export_dir(&self) -> Option<PathBuf> {
        self.export_dir
            .clone()
            .or_else(dirs::document_dir)
            .or_else(|| self.resolved_data_dir())
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// How long status messages stay visible
    pub status_duration_secs: u32,
    /// Color theme (dark/light)
    pub theme: Theme,
    /// Key held down during the active test reproduction phase
    #[serde(default = "default_hold_key")]
    pub hold_key: char,
}

fn default_hold_key() -> char {
    ' '
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            status_duration_secs: 3,
            theme: Theme::Dark,
            hold_key: default_hold_key(),
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ui.refresh_rate_hz.max(1) as u64)
    }

    /// Get status message lifetime as Duration
    pub fn status_duration(&self) -> Duration {
        Duration::from_secs(self.ui.status_duration_secs as u64)
    }
}
