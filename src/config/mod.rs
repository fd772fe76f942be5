//! Configuration management for deepseek-reader.
//!
//! Handles:
//! - Display formats and time zone
//! - Search debounce delay
//! - Theme settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};
use crate::render::{available_themes, RenderOptions, Theme, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT};
use crate::search::SortOrder;
use crate::util::{atomic_write, Zone};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DSREAD_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "display.datetime_format",
    "display.date_format",
    "display.default_sort",
    "display.timezone",
    "search.debounce_ms",
    "theme.name",
    "theme.color",
];

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Search options.
    #[serde(default)]
    pub search: SearchConfig,
    /// Theme.
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Config {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReaderError::io(format!("Failed to read config file: {}", path.display()), e))?;

        let config: Self = toml::from_str(&content).map_err(|e| ReaderError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// The file is replaced atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ReaderError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;
        atomic_write(path, content.as_bytes())
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if Theme::from_name(&self.theme.name).is_none() {
            return Err(ReaderError::InvalidConfig {
                message: format!(
                    "unknown theme '{}' (available: {})",
                    self.theme.name,
                    available_themes().join(", ")
                ),
            });
        }
        if self.display.datetime_format.is_empty() || self.display.date_format.is_empty() {
            return Err(ReaderError::InvalidConfig {
                message: "date formats must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Read one value by dotted key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "display.datetime_format" => self.display.datetime_format.clone(),
            "display.date_format" => self.display.date_format.clone(),
            "display.default_sort" => self.display.default_sort.to_string(),
            "display.timezone" => match self.display.timezone {
                Zone::Local => "local".to_string(),
                Zone::Utc => "utc".to_string(),
            },
            "search.debounce_ms" => self.search.debounce_ms.to_string(),
            "theme.name" => self.theme.name.clone(),
            "theme.color" => self.theme.color.to_string(),
            _ => return None,
        })
    }

    /// Set one value by dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |reason: String| ReaderError::InvalidConfig {
            message: format!("{key}: {reason}"),
        };

        let mut next = self.clone();
        match key {
            "display.datetime_format" => next.display.datetime_format = value.to_string(),
            "display.date_format" => next.display.date_format = value.to_string(),
            "display.default_sort" => {
                next.display.default_sort = <SortOrder as clap::ValueEnum>::from_str(value, true).map_err(invalid)?;
            }
            "display.timezone" => {
                next.display.timezone = <Zone as clap::ValueEnum>::from_str(value, true).map_err(invalid)?;
            }
            "search.debounce_ms" => {
                next.search.debounce_ms = value.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "theme.name" => next.theme.name = value.to_string(),
            "theme.color" => {
                next.theme.color = value.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            _ => {
                return Err(ReaderError::ConfigError {
                    message: format!("unknown key '{key}' (known: {})", KEYS.join(", ")),
                })
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Timestamp display options.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            zone: self.display.timezone,
            datetime_format: self.display.datetime_format.clone(),
            date_format: self.display.date_format.clone(),
        }
    }

    /// Configured theme, falling back to the default.
    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme.name).unwrap_or_default()
    }

    /// Search debounce delay.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// strftime format for timestamps.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
    /// strftime format for dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Initial list order.
    #[serde(default)]
    pub default_sort: SortOrder,
    /// Zone for display and date filters.
    #[serde(default)]
    pub timezone: Zone,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            datetime_format: default_datetime_format(),
            date_format: default_date_format(),
            default_sort: SortOrder::default(),
            timezone: Zone::default(),
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a typed query is applied.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme name.
    #[serde(default = "default_theme")]
    pub name: String,
    /// Use color output on the command line.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme(),
            color: true,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_theme() -> String {
    "dark".to_string()
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| ReaderError::ConfigError {
        message: "could not determine the config directory".to_string(),
    })?;

    Ok(config_dir.join("deepseek-reader").join("config.toml"))
}

/// Config path to use: an explicit one, else the default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load from an explicit path, or from the default location if it exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.display.default_sort, SortOrder::Newest);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[search]\ndebounce_ms = 50\n").unwrap();
        assert_eq!(config.search.debounce_ms, 50);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("display.default_sort", "title").unwrap();
        config.set("display.timezone", "utc").unwrap();
        config.set("theme.name", "light").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("display.default_sort").as_deref(), Some("title"));
        assert_eq!(loaded.render_options().zone, Zone::Utc);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("search.debounce_ms", "soon").is_err());
        assert!(config.set("display.default_sort", "random").is_err());
        assert!(matches!(
            config.set("no.such.key", "1"),
            Err(ReaderError::ConfigError { .. })
        ));
        assert!(config.set("theme.name", "neon").is_err());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[theme]\nname = \"neon\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ReaderError::InvalidConfig { .. })));

        std::fs::write(&path, "not toml at all [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "{key}");
        }
    }
}
