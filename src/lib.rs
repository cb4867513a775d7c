//! Traffic and weather forecast for a chosen coordinate.
//!
//! This crate defines:
//! - Reverse geocoding and OpenWeather forecast adapters
//! - A simulated traffic estimator and the hour-by-hour series assembler
//! - The render pass and its session state
//! - Dual-axis chart rendering (SVG / PNG)
//!
//! It is used by the `traffic-forecast` CLI and by `traffic-forecast-server`.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod traffic;
pub mod weather;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardView, Session};
pub use error::{ChartError, ConfigError, DurationError, WeatherError};
pub use forecast::{assemble, ForecastDuration};
pub use geocode::{Geocoder, UNKNOWN_LOCATION};
pub use model::{Coordinate, ForecastEntry, ForecastSeries, SeriesPoint};
pub use traffic::estimate_traffic;
pub use weather::WeatherClient;

/// Install the `tracing` subscriber used by the binaries. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
