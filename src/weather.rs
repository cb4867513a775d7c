//! OpenWeather 5-day / 3-hour forecast client.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::WeatherError;
use crate::model::{Coordinate, ForecastEntry};

/// Only `list` is required. Entries are read one at a time so a malformed
/// entry affects nothing but itself.
#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<Value>,
}

/// Reads one `list` entry. Unreadable `main.temp` or `weather[0].description`
/// become `None`; an entry without a usable `dt` is dropped.
fn parse_entry(raw: &Value) -> Option<ForecastEntry> {
    let Some(dt) = raw.get("dt").and_then(Value::as_i64) else {
        tracing::warn!("Dropping forecast entry without a numeric dt: {}", raw);
        return None;
    };
    let Some(timestamp) = DateTime::<Utc>::from_timestamp(dt, 0) else {
        tracing::warn!("Dropping forecast entry with invalid timestamp {}", dt);
        return None;
    };

    let temperature = raw
        .get("main")
        .and_then(|main| main.get("temp"))
        .and_then(Value::as_f64);
    let description = raw
        .get("weather")
        .and_then(|weather| weather.get(0))
        .and_then(|first| first.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ForecastEntry {
        timestamp,
        temperature,
        description,
    })
}

/// Forecast entries plus a user-facing notice when the fetch failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastFetch {
    pub entries: Vec<ForecastEntry>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(http, &config.weather_url, config.api_key.clone())
    }

    /// Fetches the forecast for `coordinate`, in upstream order.
    pub async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(WeatherError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        let entries: Vec<_> = parsed
            .list
            .iter()
            .filter_map(parse_entry)
            .collect();

        tracing::debug!("Fetched {} forecast entries for {}", entries.len(), coordinate);
        Ok(entries)
    }

    /// Like [`fetch_forecast`](Self::fetch_forecast) but never fails: errors
    /// become an empty forecast and a notice for the page.
    pub async fn fetch_forecast_or_empty(&self, coordinate: Coordinate) -> ForecastFetch {
        match self.fetch_forecast(coordinate).await {
            Ok(entries) => ForecastFetch {
                entries,
                notice: None,
            },
            Err(e) => {
                tracing::warn!("Weather fetch for {} failed: {}", coordinate, e);
                ForecastFetch {
                    entries: Vec::new(),
                    notice: Some(e.user_message()),
                }
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
