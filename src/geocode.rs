//! Reverse geocoding: coordinates to a human-readable place name.
//! Uses Nominatim (OpenStreetMap), which requires a `User-Agent` but no key.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::model::Coordinate;

/// Shown when the place name cannot be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
}

/// Exact bit patterns of a coordinate pair, so `f64`s can key a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordinateKey(u64, u64);

impl From<Coordinate> for CoordinateKey {
    fn from(c: Coordinate) -> Self {
        CoordinateKey(c.latitude.to_bits(), c.longitude.to_bits())
    }
}

/// Reverse geocoder with a process-lifetime memo of every coordinate it has
/// looked up. Entries are never evicted.
#[derive(Debug)]
pub struct Geocoder {
    http: Client,
    base_url: String,
    user_agent: String,
    cache: HashMap<CoordinateKey, String>,
}

impl Geocoder {
    pub fn new(http: Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(http, &config.geocoder_url, &config.user_agent)
    }

    /// Place name for `coordinate`, or [`UNKNOWN_LOCATION`] on any failure.
    /// The outcome, sentinel included, is cached for the coordinate.
    pub async fn location_name(&mut self, coordinate: Coordinate) -> String {
        let key = CoordinateKey::from(coordinate);
        if let Some(name) = self.cache.get(&key) {
            tracing::debug!("Geocode cache hit for {}", coordinate);
            return name.clone();
        }

        let name = self
            .lookup(coordinate)
            .await
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        self.cache.insert(key, name.clone());
        name
    }

    /// Number of coordinates memoized so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    async fn lookup(&self, coordinate: Coordinate) -> Option<String> {
        let url = format!("{}/reverse", self.base_url);

        let response = match self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let name = body.display_name?;
        tracing::info!("Reverse geocoded {} to: {}", coordinate, name);
        Some(name)
    }
}
