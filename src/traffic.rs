//! Simulated traffic level derived from the clock and the weather.

use chrono::Weekday;

const RAIN_BONUS: u32 = 15;
const WEEKEND_DISCOUNT: u32 = 10;

/// Returns a synthetic traffic level for the given hour of day (0-23), day of
/// week and weather description.
///
/// Rush hours (8-11, 17-20) start at 80, shoulder hours (6-7, 21-22) at 50 and
/// everything else at 20, each with a small hour-dependent offset. Rain adds 15
/// when the base level is above 20; weekends subtract 10. The result is floored
/// at zero but has no upper bound. Hours past 23 fall into the off-peak bucket.
pub fn estimate_traffic(hour: u32, weekday: Weekday, description: &str) -> u32 {
    let mut traffic = match hour {
        8..=11 | 17..=20 => 80 + hour % 10,
        6..=7 | 21..=22 => 50 + hour % 5,
        _ => 20 + hour % 5,
    };

    // Gate is checked against the base level, before the weekend discount.
    if traffic > 20 && description.to_lowercase().contains("rain") {
        traffic += RAIN_BONUS;
    }

    if is_weekend(weekday) {
        traffic = traffic.saturating_sub(WEEKEND_DISCOUNT);
    }

    traffic
}

fn is_weekend(weekday: Weekday) -> bool {
    weekday.num_days_from_monday() >= 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_hours_on_weekday() {
        for hour in [8, 9, 10, 11, 17, 18, 19, 20] {
            assert_eq!(
                estimate_traffic(hour, Weekday::Mon, "clear"),
                80 + hour % 10,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn moderate_hours_on_weekday() {
        for hour in [6, 7, 21, 22] {
            assert_eq!(
                estimate_traffic(hour, Weekday::Mon, "clear"),
                50 + hour % 5,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn off_peak_hours_on_weekday() {
        for hour in [0, 1, 2, 3, 4, 5, 12, 13, 14, 15, 16, 23] {
            assert_eq!(
                estimate_traffic(hour, Weekday::Tue, "clear"),
                20 + hour % 5,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn rain_adds_bonus_above_base_twenty() {
        let dry = estimate_traffic(12, Weekday::Mon, "clear");
        let wet = estimate_traffic(12, Weekday::Mon, "heavy rain");
        assert_eq!(dry, 22);
        assert_eq!(wet, dry + 15);
    }

    #[test]
    fn rain_match_is_case_insensitive() {
        assert_eq!(estimate_traffic(9, Weekday::Wed, "Light RAIN"), 89 + 15);
        assert_eq!(estimate_traffic(9, Weekday::Wed, "Thunderstorm with rain"), 104);
    }

    #[test]
    fn no_rain_bonus_when_base_is_twenty() {
        // 0 % 5 == 0 and 5 % 5 == 0 both give a base of exactly 20.
        assert_eq!(estimate_traffic(0, Weekday::Mon, "moderate rain"), 20);
        assert_eq!(estimate_traffic(5, Weekday::Mon, "moderate rain"), 20);
    }

    #[test]
    fn weekend_discount_on_peak_hours() {
        for weekday in [Weekday::Sat, Weekday::Sun] {
            for hour in [8, 9, 10, 11, 17, 18, 19, 20] {
                assert_eq!(
                    estimate_traffic(hour, weekday, "clear"),
                    80 + hour % 10 - 10,
                    "{weekday} hour {hour}"
                );
            }
        }
    }

    #[test]
    fn weekend_rain_uses_base_before_discount() {
        // Base 22 at 02:00, rain bonus applies, then weekend discount.
        assert_eq!(estimate_traffic(2, Weekday::Sat, "heavy rain"), 22 + 15 - 10);
        // Base 20 at 05:00, no rain bonus, weekend discount only.
        assert_eq!(estimate_traffic(5, Weekday::Sun, "heavy rain"), 10);
    }

    #[test]
    fn never_negative_and_unbounded_above() {
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            for hour in 0..24 {
                let level = estimate_traffic(hour, weekday, "rain");
                assert!(level >= 10, "{weekday} hour {hour} gave {level}");
            }
        }
        // 19:00 weekday rain exceeds 100.
        assert_eq!(estimate_traffic(19, Weekday::Fri, "rain"), 104);
    }

    #[test]
    fn out_of_range_hours_are_off_peak() {
        assert_eq!(estimate_traffic(24, Weekday::Mon, "clear"), 24);
        assert_eq!(estimate_traffic(u32::MAX, Weekday::Mon, "clear"), 20);
        assert_eq!(estimate_traffic(u32::MAX - 1, Weekday::Mon, "clear"), 24);
        assert_eq!(estimate_traffic(u32::MAX - 1, Weekday::Sat, "rain"), 24 + 15 - 10);
    }
}
