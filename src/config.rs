use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store file; when unset the profile's data dir decides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
    #[serde(skip)]
    pub profile: utils::Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_add")]
    pub add: String,
    #[serde(default = "default_toggle")]
    pub toggle: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_filter_next")]
    pub filter_next: String,
    #[serde(default = "default_filter_prev")]
    pub filter_prev: String,
    #[serde(default = "default_mark_all_read")]
    pub mark_all_read: String,
    #[serde(default = "default_toggle_dark_mode")]
    pub toggle_dark_mode: String,
    #[serde(default = "default_export")]
    pub export: String,
    #[serde(default = "default_clear_all")]
    pub clear_all: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level(),
            toast_duration_ms: default_toast_duration_ms(),
            key_bindings: KeyBindings::default(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
            profile: utils::Profile::default(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            add: default_add(),
            toggle: default_toggle(),
            delete: default_delete(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            filter_next: default_filter_next(),
            filter_prev: default_filter_prev(),
            mark_all_read: default_mark_all_read(),
            toggle_dark_mode: default_toggle_dark_mode(),
            export: default_export(),
            clear_all: default_clear_all(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            tab_bg: default_tab_bg(),
        }
    }
}

impl Theme {
    /// Themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            tab_bg: "gray".to_string(),
        });

        themes.insert("dark".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "cyan".to_string(),
            highlight_fg: "black".to_string(),
            tab_bg: "darkgray".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_toast_duration_ms() -> u64 {
    3000
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_add() -> String {
    "a".to_string()
}

fn default_toggle() -> String {
    "Space".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_filter_next() -> String {
    "Tab".to_string()
}

fn default_filter_prev() -> String {
    "BackTab".to_string()
}

fn default_mark_all_read() -> String {
    "r".to_string()
}

fn default_toggle_dark_mode() -> String {
    "m".to_string()
}

fn default_export() -> String {
    "Ctrl+e".to_string()
}

fn default_clear_all() -> String {
    "Ctrl+x".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_fg() -> String {
    "black".to_string()
}

fn default_bg() -> String {
    "white".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config dir, creating the default
    /// file if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Ok(Self::load_from(&config_path)?.with_profile(profile))
    }

    /// Load configuration from an explicit path, creating it with defaults if
    /// it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Profile whose data dir holds the store when `database_path` is unset
    pub fn with_profile(mut self, profile: utils::Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Save configuration to `config_path`
    pub fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("routine.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/daily-routine-dev/routine.db".to_string(),
                utils::Profile::Prod => "~/.local/share/daily-routine/routine.db".to_string(),
            }
        }
    }

    /// Store file path: the configured `database_path` (with ~ expansion),
    /// else `routine.db` in the profile's data dir
    pub fn get_database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => utils::expand_path(path),
            None => utils::expand_path(&Self::default_database_path_for_profile(self.profile)),
        }
    }

    /// Directory for rotated log files, next to the store
    pub fn get_log_dir(&self) -> PathBuf {
        let db_path = self.get_database_path();
        db_path
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// Resolve a theme by name: user-defined first, then presets, then "light"
    pub fn resolve_theme(&self, name: &str) -> Theme {
        if let Some(theme) = self.themes.get(name) {
            return theme.clone();
        }
        let presets = Theme::get_preset_themes();
        presets
            .get(name)
            .or_else(|| presets.get("light"))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.toast_duration_ms, 3000);
        assert_eq!(config.key_bindings.toggle, "Space");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "toast_duration_ms = 1500\n[key_bindings]\nquit = \"x\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.toast_duration(), Duration::from_millis(1500));
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.add, "a");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn configured_database_path_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let db = dir.path().join("elsewhere.db");
        fs::write(&path, format!("database_path = {:?}\n", db.to_str().unwrap())).unwrap();
        let config = Config::load_from(&path).unwrap().with_profile(utils::Profile::Dev);
        assert_eq!(config.get_database_path(), db);
    }

    #[test]
    fn unset_database_path_follows_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database_path, None);
        assert!(!fs::read_to_string(&path).unwrap().contains("database_path"));

        let dev = config.clone().with_profile(utils::Profile::Dev).get_database_path();
        let prod = config.with_profile(utils::Profile::Prod).get_database_path();
        assert!(dev.ends_with("routine.db"));
        assert_ne!(dev, prod);
    }

    #[test]
    fn unknown_theme_falls_back_to_light() {
        let config = Config::default();
        assert_eq!(config.resolve_theme("neon"), Theme::get_preset_themes()["light"]);
        assert_eq!(config.resolve_theme("dark"), Theme::get_preset_themes()["dark"]);
    }
}
