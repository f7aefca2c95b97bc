//! Configuration management for Easy Notes
//!
//! Handles loading, saving, and managing application configuration.
//! Configuration is a JSON file in the platform config directory; a missing
//! file means "use defaults".

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.example.EasyNotes";

/// Quiet period after the last keystroke before a capture is committed
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Maximum undo history entries
pub const MAX_UNDO_HISTORY: usize = 1000;

/// File holding the persisted key-value pairs
pub const DEFAULT_STORE_FILE: &str = "tabs_prefs.json";

/// Key the tab list is stored under
pub const DEFAULT_STORE_KEY: &str = "saved_tabs";

/// Category used when neither a category nor a title is available
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// Default note background (white, packed RGB)
pub const DEFAULT_NOTE_COLOR: u32 = 0xFF_FF_FF;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor configuration
    pub editor: EditorConfig,

    /// Tab persistence configuration
    pub tabs: TabsConfig,

    /// Note defaults
    pub notes: NotesConfig,
}

impl Config {
    /// Load configuration from the config directory or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_dir()?.join("config.json");
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_dir()?.join("config.json");
        self.save_to(&path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.editor.max_undo_history == 0 {
            return Err(ConfigError::InvalidValue {
                key: "editor.max_undo_history".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.tabs.store_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tabs.store_key".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path (for the persisted tab store)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Full path of the tab store file
    pub fn store_path(&self) -> ConfigResult<PathBuf> {
        Self::data_dir().map(|p| p.join(&self.tabs.store_file))
    }
}

/// Editor-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Capture debounce in milliseconds
    pub debounce_ms: u64,

    /// Maximum undo history entries
    pub max_undo_history: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_undo_history: MAX_UNDO_HISTORY,
        }
    }
}

/// Tab persistence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// File name of the key-value store inside the data directory
    pub store_file: String,

    /// Key the serialized tab list is written under
    pub store_key: String,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            store_file: DEFAULT_STORE_FILE.to_string(),
            store_key: DEFAULT_STORE_KEY.to_string(),
        }
    }
}

/// Defaults applied to new notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Category for notes created outside any tab
    pub default_category: String,

    /// Background color for new notes
    pub default_color: u32,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            default_category: FALLBACK_CATEGORY.to_string(),
            default_color: DEFAULT_NOTE_COLOR,
        }
    }
}
