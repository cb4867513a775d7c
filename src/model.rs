use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude used when no coordinate has been selected yet (New Delhi).
pub const DEFAULT_LATITUDE: f64 = 28.6139;
/// Longitude used when no coordinate has been selected yet (New Delhi).
pub const DEFAULT_LONGITUDE: f64 = 77.2090;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// One 3-hour forecast bucket as returned by the weather service.
///
/// Temperature and description are optional because the upstream payload does
/// not guarantee them; the assembler falls back to defaults when either one is
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
}

impl ForecastEntry {
    /// Temperature and description together, or `None` if either is missing.
    pub fn reading(&self) -> Option<(f64, &str)> {
        let temperature = self.temperature?;
        let description = self.description.as_deref()?;
        Some((temperature, description))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Local wall-clock label, `HH:MM`.
    pub hour: String,
    pub traffic: u32,
    pub temperature: Option<f64>,
    pub description: String,
}

/// Hour-by-hour output of one render pass. Index `i` corresponds to
/// "now + i hours".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub points: Vec<SeriesPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn hours(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.hour.as_str()).collect()
    }

    pub fn traffic(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.traffic).collect()
    }

    pub fn temperatures(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    /// Writes the series as CSV with a `hour,traffic,temperature,description`
    /// header. Absent temperatures become empty cells.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for point in &self.points {
            wtr.serialize(point)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
