//! Persisted application configuration.
//!
//! One flat TOML file holds the resolved location record plus appearance
//! preferences. Reads and writes are whole-file; there are no partial
//! merges, so re-resolving a location overwrites the previous record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// The resolved, persisted location record.
///
/// A record is "unset" unless every required field is present; partial
/// records are treated the same as an absent one. Values are only written
/// by a successful resolution, so presence is what `is_valid` checks,
/// not content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub city: Option<String>,

    /// 2-letter state abbreviation, uppercase.
    pub state: Option<String>,

    /// Set only when the location was resolved from a postal code.
    pub postal_code: Option<String>,

    /// County name with any trailing " County" suffix stripped.
    pub county: Option<String>,

    /// Decimal degrees, rounded to 4 places.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// NWS forecast office identifier (e.g. "MLB").
    pub office: Option<String>,

    /// Grid coordinates, kept as strings the way they are interpolated
    /// into forecast URLs.
    pub grid_x: Option<String>,
    pub grid_y: Option<String>,
}

impl LocationConfig {
    /// True when every required field is present.
    pub fn is_valid(&self) -> bool {
        self.city.is_some()
            && self.state.is_some()
            && self.county.is_some()
            && self.latitude.is_some()
            && self.longitude.is_some()
            && self.office.is_some()
            && self.grid_x.is_some()
            && self.grid_y.is_some()
    }
}

fn default_window_theme() -> String {
    "light".to_string()
}

fn default_icon_theme() -> String {
    "dark".to_string()
}

/// Window/icon theme preferences, persisted alongside the location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default = "default_window_theme")]
    pub window_theme: String,

    #[serde(default = "default_icon_theme")]
    pub icon_theme: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            window_theme: default_window_theme(),
            icon_theme: default_icon_theme(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub appearance: AppearanceConfig,
}

impl Config {
    /// Load configuration from the default path, creating a default file
    /// if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default path, overwriting the whole file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::Write)?;

        Ok(())
    }

    /// Reset the location record to unset. The caller persists the change
    /// with `save`, which overwrites the previous record wholesale.
    pub fn clear_location(&mut self) {
        tracing::info!("Clearing saved location");
        self.location = LocationConfig::default();
    }

    /// Update one or both appearance preferences, leaving the rest of the
    /// record untouched.
    pub fn update_appearance(&mut self, window_theme: Option<&str>, icon_theme: Option<&str>) {
        if let Some(theme) = window_theme {
            self.appearance.window_theme = theme.to_string();
        }
        if let Some(theme) = icon_theme {
            self.appearance.icon_theme = theme.to_string();
        }
    }

    /// Get the path to the configuration file.
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("gridcast");

        Ok(config_dir.join("config.toml"))
    }
}
