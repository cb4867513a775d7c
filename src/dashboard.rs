//! One render pass of the dashboard and the session state it mutates.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt;

use crate::config::Config;
use crate::forecast::{assemble, ForecastDuration};
use crate::geocode::Geocoder;
use crate::model::{Coordinate, ForecastSeries};
use crate::weather::WeatherClient;

/// State that survives between render passes for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    coordinate: Coordinate,
    last_refresh: Option<DateTime<Local>>,
}

impl Session {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            last_refresh: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Replace the selected coordinate (the "Get Forecast" action).
    pub fn select(&mut self, coordinate: Coordinate) {
        tracing::info!("Selected coordinate {}", coordinate);
        self.coordinate = coordinate;
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    /// Whole minutes since the previous render, then moves the baseline to
    /// `now`. The first call reports 0.
    ///
    /// Because the baseline moves on every call, under periodic refresh this
    /// reads as the refresh interval rather than time since the user last
    /// fetched.
    pub fn minutes_since_refresh(&mut self, now: DateTime<Local>) -> i64 {
        let last = *self.last_refresh.get_or_insert(now);
        let elapsed = (now - last).num_seconds().div_euclid(60);
        self.last_refresh = Some(now);
        elapsed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Coordinate::default())
    }
}

/// Everything the presentation layer needs from one pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub location: String,
    pub coordinate: Coordinate,
    pub duration: ForecastDuration,
    pub minutes_since_refresh: i64,
    pub generated_at: DateTime<Local>,
    /// Non-fatal problem to surface on the page.
    pub notice: Option<String>,
    pub series: ForecastSeries,
}

/// Adapters used by a render pass.
#[derive(Debug)]
pub struct Dashboard {
    geocoder: Geocoder,
    weather: WeatherClient,
}

impl Dashboard {
    pub fn new(geocoder: Geocoder, weather: WeatherClient) -> Self {
        Self { geocoder, weather }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::new(
            Geocoder::from_config(http.clone(), config),
            WeatherClient::from_config(http, config),
        ))
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Runs one complete pass: geocode, fetch, assemble, refresh bookkeeping.
    /// Never fails; upstream problems degrade to defaults and a notice.
    pub async fn render<Tz>(
        &mut self,
        session: &mut Session,
        duration: ForecastDuration,
        now: DateTime<Tz>,
    ) -> DashboardView
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let coordinate = session.coordinate();
        let location = self.geocoder.location_name(coordinate).await;
        let minutes_since_refresh = session.minutes_since_refresh(now.with_timezone(&Local));

        let fetch = self.weather.fetch_forecast_or_empty(coordinate).await;
        let series = assemble(&fetch.entries, duration, &now);

        tracing::info!(
            "Rendered {} for {} ({}) with {} forecast entries",
            duration,
            location,
            coordinate,
            fetch.entries.len()
        );

        DashboardView {
            location,
            coordinate,
            duration,
            minutes_since_refresh,
            generated_at: now.with_timezone(&Local),
            notice: fetch.notice,
            series,
        }
    }
}
