//! Error types shared by the library.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("No OpenWeather API key configured")]
    MissingApiKey,

    #[error("Forecast request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse forecast response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WeatherError {
    /// Short message suitable for showing on the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Could not fetch weather data: no API key configured.".to_string()
            }
            _ => "Could not fetch weather data.".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),

    #[error("Failed to rasterize chart: {0}")]
    Raster(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Forecast duration must be between 3 and 24 hours in steps of 3, got {0}")]
pub struct DurationError(pub u32);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
