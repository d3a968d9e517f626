//! Configuration management for drainadopt.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use drainadopt_maps::LatLng;

use crate::error::{Error, Result};
use crate::model::{Role, Session, User};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "drainadopt";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "DRAINADOPT_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DRAINADOPT_`, sections split by `__`,
///    e.g. `DRAINADOPT_MAPS__API_KEY`)
/// 2. TOML config file at `~/.config/drainadopt/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Drain API configuration.
    pub api: ApiConfig,
    /// Google Maps configuration.
    pub maps: MapsConfig,
    /// Image host configuration.
    pub images: ImagesConfig,
    /// Signed-in session.
    pub session: SessionConfig,
}

/// Drain API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the drain service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Google Maps configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Maps API key. Without it the map views stay in their load-error state.
    pub api_key: Option<String>,
    /// Upper bound on a reverse geocoding lookup, in milliseconds.
    pub geocode_timeout_ms: u64,
    /// Latitude the picker centers on when no location is set.
    pub default_latitude: f64,
    /// Longitude the picker centers on when no location is set.
    pub default_longitude: f64,
}

/// Image host (Cloudinary) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Cloudinary cloud name.
    pub cloud_name: Option<String>,
    /// Unsigned upload preset.
    pub upload_preset: Option<String>,
    /// Folder uploads are filed under.
    pub folder: String,
}

/// The signed-in user, standing in for the external auth context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bearer token sent with authenticated requests.
    pub token: Option<String>,
    /// Identifier of the signed-in user.
    pub user_id: Option<i64>,
    /// Role of the signed-in user.
    pub role: Role,
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_timeout_ms: 5_000,
            // New York City Hall
            default_latitude: 40.7128,
            default_longitude: -74.0060,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            upload_preset: None,
            folder: drainadopt_images::DEFAULT_FOLDER.to_string(),
        }
    }
}

/// Cloudinary identifiers: letters, digits, dashes and underscores.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static pattern is valid"))
}

/// Folder paths: identifiers separated by single slashes.
fn folder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(/[A-Za-z0-9_-]+)*$").expect("static pattern is valid")
    })
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate API config
        if let Err(e) = reqwest::Url::parse(&self.api.base_url) {
            return Err(invalid(format!(
                "api.base_url ({}) is not a valid URL: {e}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(invalid("api.timeout_secs must be greater than 0"));
        }

        // Validate maps config
        if self.maps.geocode_timeout_ms == 0 {
            return Err(invalid("maps.geocode_timeout_ms must be greater than 0"));
        }

        if !(-90.0..=90.0).contains(&self.maps.default_latitude) {
            return Err(invalid(format!(
                "maps.default_latitude ({}) must be between -90 and 90",
                self.maps.default_latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.maps.default_longitude) {
            return Err(invalid(format!(
                "maps.default_longitude ({}) must be between -180 and 180",
                self.maps.default_longitude
            )));
        }

        // Validate image host identifiers
        for (field, value) in [
            ("images.cloud_name", &self.images.cloud_name),
            ("images.upload_preset", &self.images.upload_preset),
        ] {
            if let Some(value) = value {
                if !identifier_pattern().is_match(value) {
                    return Err(invalid(format!("{field} ({value}) contains invalid characters")));
                }
            }
        }

        if !folder_pattern().is_match(&self.images.folder) {
            return Err(invalid(format!(
                "images.folder ({}) is not a valid folder path",
                self.images.folder
            )));
        }

        // Validate session
        if self.session.token.is_some() && self.session.user_id.is_none() {
            return Err(invalid("session.token is set but session.user_id is missing"));
        }

        Ok(())
    }

    /// Build the session described by the `[session]` section.
    #[must_use]
    pub fn session(&self) -> Session {
        match self.session.user_id {
            Some(id) => Session::signed_in(
                User {
                    id,
                    name: self.session.name.clone(),
                    email: self.session.email.clone(),
                    role: self.session.role,
                },
                self.session.token.clone(),
            ),
            None => Session::anonymous(),
        }
    }

    /// Get the API request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Get the reverse geocoding timeout as a Duration.
    #[must_use]
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.maps.geocode_timeout_ms)
    }

    /// Where the location picker centers when nothing is selected.
    #[must_use]
    pub fn default_center(&self) -> LatLng {
        LatLng::new(self.maps.default_latitude, self.maps.default_longitude)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
