//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-browser.toml file.
//! It provides a centralized way to configure the engine command line, the default
//! station, host display capabilities and the user's home location.
//!
//! The default station can also come from the `XTIDE_DEFAULT_LOCATION` environment
//! variable, the same one the engine itself reads. That value is untrusted: it is
//! trimmed, and an empty result means "unset".

use crate::TideError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-browser.toml";

/// Environment variable naming the default station
pub const DEFAULT_STATION_ENV: &str = "XTIDE_DEFAULT_LOCATION";

/// Locale forced on every engine invocation so its text is always ISO-8859-1
pub const LOCALE_ENVIRONMENT: [(&str, &str); 3] =
    [("LANG", "C"), ("LC_ALL", "C"), ("LC_CTYPE", "C")];

/// Application configuration loaded from tide-browser.toml
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// How to run the prediction engine
    pub engine: EngineConfig,
    /// Session defaults
    pub session: SessionConfig,
    /// Host display capabilities
    pub display: DisplayConfig,
    /// The user's own location, for distance sorting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeLocation>,
}

/// Prediction engine command line settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine program name or path
    pub command: String,
    /// Arguments inserted before every protocol argument list
    pub leading_args: Vec<String>,
    /// Terminal width hint for the station listing; wide enough that no name wraps
    pub listing_width: u32,
    /// Terminal width hint for text renders
    pub text_width: u32,
    /// Pixel width for graph images
    pub graphics_width: u32,
    /// Extra variables for the engine's environment (e.g. `HFILE_PATH`)
    pub environment: BTreeMap<String, String>,
}

/// Session defaults
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Station used when none is given explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_station: Option<String>,
}

/// What the host can display
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Host can show images, so graphs are requested as images instead of text
    pub images: bool,
}

/// A fixed location in degrees, north and east positive
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl HomeLocation {
    /// `(latitude, longitude)` in radians.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            command: "tide".to_string(),
            leading_args: Vec::new(),
            listing_width: 110,
            text_width: 79,
            graphics_width: 960,
            environment: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Environment for the engine child: configured extras, then the forced locale.
    ///
    /// The locale always wins, even over a configured `LANG`.
    pub fn child_environment(&self) -> Vec<(String, String)> {
        let mut environment: BTreeMap<String, String> = self.environment.clone();
        for (key, value) in LOCALE_ENVIRONMENT {
            environment.insert(key.to_string(), value.to_string());
        }
        environment.into_iter().collect()
    }
}

/// Trim an untrusted station name; empty means unset.
pub fn normalize_station(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    /// Load configuration from tide-browser.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    ///
    /// A set but blank `XTIDE_DEFAULT_LOCATION` clears the configured default.
    pub fn with_environment<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(DEFAULT_STATION_ENV) {
            self.session.default_station = normalize_station(&raw);
        }
        self
    }

    /// Pick the station to open: the explicit one, else the configured default.
    pub fn station(&self, explicit: Option<&str>) -> Result<String, TideError> {
        explicit
            .and_then(normalize_station)
            .or_else(|| {
                self.session
                    .default_station
                    .as_deref()
                    .and_then(normalize_station)
            })
            .ok_or_else(|| {
                TideError::Configuration(format!(
                    "no station given; pass one, set {DEFAULT_STATION_ENV}, or pick one from the directory"
                ))
            })
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
