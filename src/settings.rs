//! Player preferences
//!
//! Persisted as JSON next to the binary, separate from match configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "ARCADE_PONG_SETTINGS";

const DEFAULT_FILE: &str = "arcade_pong_settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the headless driver draws snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// ASCII arena
    #[default]
    Text,
    /// One JSON snapshot per line
    Json,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Text => "text",
            RenderMode::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "ascii" => Some(RenderMode::Text),
            "json" => Some(RenderMode::Json),
            _ => None,
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound_enabled: bool,
    /// Fixed RNG seed; `None` picks a fresh one each run
    pub seed: Option<u64>,
    pub render: RenderMode,
    /// Draw one frame every this many ticks
    pub render_every: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            seed: None,
            render: RenderMode::Text,
            render_every: 4,
        }
    }
}

impl Settings {
    /// `ARCADE_PONG_SETTINGS` if set, otherwise the working directory
    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
    }

    /// Render interval, never zero
    pub fn render_interval(&self) -> u32 {
        self.render_every.max(1)
    }

    pub fn read_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from `path`, falling back to defaults when missing or unreadable
    pub fn load(path: &Path) -> Self {
        match Self::read_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save to `path`; failures are logged, never fatal
    pub fn save(&self, path: &Path) {
        match self.write_to(path) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}
