use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DurationError;
use crate::model::{ForecastEntry, ForecastSeries, SeriesPoint};
use crate::traffic::estimate_traffic;

/// Description used when no forecast value is available for an hour.
pub const DEFAULT_DESCRIPTION: &str = "clear";

/// Number of hours to project, one of 3, 6, ..., 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ForecastDuration(u32);

impl ForecastDuration {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 24;
    pub const STEP: u32 = 3;

    pub fn hours(self) -> u32 {
        self.0
    }

    /// Every selectable duration, ascending.
    pub fn choices() -> impl Iterator<Item = ForecastDuration> {
        (Self::MIN..=Self::MAX)
            .step_by(Self::STEP as usize)
            .map(ForecastDuration)
    }
}

impl Default for ForecastDuration {
    fn default() -> Self {
        ForecastDuration(12)
    }
}

impl TryFrom<u32> for ForecastDuration {
    type Error = DurationError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&hours) && hours % Self::STEP == 0 {
            Ok(ForecastDuration(hours))
        } else {
            Err(DurationError(hours))
        }
    }
}

impl From<ForecastDuration> for u32 {
    fn from(duration: ForecastDuration) -> Self {
        duration.0
    }
}

impl fmt::Display for ForecastDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// Picks the entry closest in time to `target`. Ties go to the earliest entry
/// in input order.
pub fn nearest_entry(entries: &[ForecastEntry], target: DateTime<Utc>) -> Option<&ForecastEntry> {
    entries
        .iter()
        .min_by_key(|e| (e.timestamp - target).num_milliseconds().abs())
}

/// Builds the hour-by-hour series starting at `now`.
///
/// Hour labels, hour of day and weekday are all taken in `now`'s time zone.
pub fn assemble<Tz>(
    entries: &[ForecastEntry],
    duration: ForecastDuration,
    now: &DateTime<Tz>,
) -> ForecastSeries
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let points = (0..duration.hours())
        .map(|offset| {
            let target = now.clone() + Duration::hours(i64::from(offset));

            let (temperature, description) =
                match nearest_entry(entries, target.with_timezone(&Utc)).and_then(|e| e.reading()) {
                    Some((temp, desc)) => (Some(temp), desc.to_string()),
                    None => (None, DEFAULT_DESCRIPTION.to_string()),
                };

            let traffic = estimate_traffic(target.hour(), target.weekday(), &description);

            SeriesPoint {
                hour: target.format("%H:%M").to_string(),
                traffic,
                temperature,
                description,
            }
        })
        .collect();

    ForecastSeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn entry(timestamp: DateTime<Utc>, temp: f64, desc: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp,
            temperature: Some(temp),
            description: Some(desc.to_string()),
        }
    }

    /// 2024-01-01 is a Monday.
    fn monday_at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn duration_accepts_multiples_of_three() {
        let hours: Vec<u32> = ForecastDuration::choices().map(|d| d.hours()).collect();
        assert_eq!(hours, vec![3, 6, 9, 12, 15, 18, 21, 24]);

        for h in hours {
            assert!(ForecastDuration::try_from(h).is_ok());
        }
    }

    #[test]
    fn duration_rejects_out_of_range_and_off_step() {
        for h in [0, 1, 2, 4, 13, 25, 27, 48] {
            let err = ForecastDuration::try_from(h).unwrap_err();
            assert_eq!(err, DurationError(h));
        }
    }

    #[test]
    fn empty_forecast_monday_morning() {
        let duration = ForecastDuration::try_from(3).unwrap();
        let series = assemble(&[], duration, &monday_at(9));

        assert_eq!(series.hours(), vec!["09:00", "10:00", "11:00"]);
        assert_eq!(series.traffic(), vec![89, 80, 81]);
        assert_eq!(series.temperatures(), vec![None, None, None]);
    }

    #[test]
    fn empty_forecast_defaults_every_point() {
        for duration in ForecastDuration::choices() {
            let series = assemble(&[], duration, &monday_at(0));
            assert_eq!(series.len(), duration.hours() as usize);
            assert!(series.points.iter().all(|p| p.temperature.is_none()));
            assert!(series.points.iter().all(|p| p.description == "clear"));
        }
    }

    #[test]
    fn nearest_entry_minimizes_time_distance() {
        let base = monday_at(0);
        let entries: Vec<_> = (0..8)
            .map(|i| entry(base + Duration::hours(3 * i), i as f64, "clear sky"))
            .collect();

        // 04:00 is one hour from 03:00 and two from 06:00.
        let found = nearest_entry(&entries, monday_at(4)).unwrap();
        assert_eq!(found.timestamp, monday_at(3));

        // 05:00 is closer to 06:00.
        let found = nearest_entry(&entries, monday_at(5)).unwrap();
        assert_eq!(found.timestamp, monday_at(6));

        // Past the last entry, the last entry wins.
        let late = base + Duration::hours(40);
        let found = nearest_entry(&entries, late).unwrap();
        assert_eq!(found.timestamp, base + Duration::hours(21));
    }

    #[test]
    fn nearest_entry_ties_resolve_to_first_in_input_order() {
        let entries = vec![
            entry(monday_at(6), 10.0, "later"),
            entry(monday_at(3), 20.0, "earlier"),
        ];

        // 04:30 is exactly between both; input order decides.
        let target = monday_at(4) + Duration::minutes(30);
        let found = nearest_entry(&entries, target).unwrap();
        assert_eq!(found.description.as_deref(), Some("later"));
    }

    #[test]
    fn uses_nearest_temperature_and_description() {
        let entries = vec![
            entry(monday_at(9), 25.0, "clear sky"),
            entry(monday_at(12), 27.5, "light rain"),
        ];

        let duration = ForecastDuration::try_from(6).unwrap();
        let series = assemble(&entries, duration, &monday_at(9));

        assert_eq!(
            series.temperatures(),
            vec![Some(25.0), Some(25.0), Some(27.5), Some(27.5), Some(27.5), Some(27.5)]
        );
        // 09:00, 10:00 clear; 11:00 onward nearest is the rain bucket.
        assert_eq!(series.traffic(), vec![89, 80, 81 + 15, 22 + 15, 23 + 15, 24 + 15]);
    }

    #[test]
    fn incomplete_entry_falls_back_to_defaults() {
        let entries = vec![ForecastEntry {
            timestamp: monday_at(9),
            temperature: Some(18.0),
            description: None,
        }];

        let duration = ForecastDuration::try_from(3).unwrap();
        let series = assemble(&entries, duration, &monday_at(9));

        assert!(series.points.iter().all(|p| p.temperature.is_none()));
        assert!(series.points.iter().all(|p| p.description == "clear"));
    }

    #[test]
    fn labels_follow_reference_time_zone() {
        // 03:30 UTC is 09:00 in India (UTC+05:30).
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = Utc
            .with_ymd_and_hms(2024, 1, 1, 3, 30, 0)
            .unwrap()
            .with_timezone(&ist);

        let duration = ForecastDuration::try_from(3).unwrap();
        let series = assemble(&[], duration, &now);

        assert_eq!(series.hours(), vec!["09:00", "10:00", "11:00"]);
        assert_eq!(series.traffic(), vec![89, 80, 81]);
    }

    #[test]
    fn crossing_midnight_into_weekend() {
        // Friday 23:00 -> Saturday 00:00, 01:00.
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 23, 0, 0).unwrap();
        let duration = ForecastDuration::try_from(3).unwrap();
        let series = assemble(&[], duration, &now);

        assert_eq!(series.hours(), vec!["23:00", "00:00", "01:00"]);
        assert_eq!(series.traffic(), vec![23, 10, 11]);
    }
}
