//! Configuration file management for clipdeck.
//!
//! Settings live in `~/.config/clipdeck/clipdeck.toml`. A file with the
//! default values is written the first time the recorder starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::recording::duration::{clamp_duration, DEFAULT_DURATION_SECS};

/// Audio input configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device to connect at startup. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `clipdeck list-devices`
    /// - device name from `clipdeck list-devices`
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

/// Recording session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Value of the duration field at startup, in seconds (1-300)
    #[serde(default = "default_duration")]
    pub default_duration: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
        }
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

/// Clip export configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipsConfig {
    /// Where saved clips go. Defaults to the user's download directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipdeckConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub clips: ClipsConfig,
}

impl ClipdeckConfig {
    /// Loads the configuration, writing the defaults first if no file exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_create() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }
        Self::load_from(&config_path)
    }

    /// Loads configuration from `path`.
    ///
    /// Out of range durations are clamped to 1-300 seconds.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let mut config: ClipdeckConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;

        let clamped = clamp_duration(config.recording.default_duration as i64);
        if clamped != config.recording.default_duration {
            tracing::warn!(
                "default_duration {} out of range, using {}",
                config.recording.default_duration,
                clamped
            );
            config.recording.default_duration = clamped;
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// - If the directory cannot be created
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Path of the config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(".config").join("clipdeck").join("clipdeck.toml"))
}
