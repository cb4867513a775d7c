use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::error::ConfigError;
use crate::forecast::ForecastDuration;
use crate::model::{Coordinate, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_USER_AGENT: &str = "TrafficForecast/1.0";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Settings read from `config.toml`.
///
/// Example:
/// ```toml
/// api_key = "..."
/// default_latitude = 51.5072
/// default_longitude = -0.1276
/// default_duration = 24
/// refresh_interval_secs = 600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_duration: ForecastDuration,
    /// How often the dashboard page reloads itself.
    pub refresh_interval_secs: u64,
    pub geocoder_url: String,
    pub weather_url: String,
    /// Sent to the geocoding service, which requires a client identifier.
    pub user_agent: String,
    /// Unset means the HTTP client's default (no timeout).
    pub http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_latitude: DEFAULT_LATITUDE,
            default_longitude: DEFAULT_LONGITUDE,
            default_duration: ForecastDuration::default(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from `path` if given, otherwise from the platform config
    /// directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let cfg: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "traffic-forecast", "traffic-forecast")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}
