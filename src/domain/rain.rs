// Rain statistics - Accumulated rainfall over trailing windows
use super::reading::RawReading;
use super::zone::DisplayZone;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RainStats {
    #[serde(rename = "1h")]
    pub last_hour: f64,
    #[serde(rename = "24h")]
    pub last_day: f64,
    #[serde(rename = "7d")]
    pub last_week: f64,
    #[serde(rename = "15d")]
    pub last_fortnight: f64,
    #[serde(rename = "30d")]
    pub last_month: f64,
}

/// Sum `rain_cm` of every reading at or after each window's start, counted
/// back from `now`.
pub fn rain_stats(readings: &[RawReading], now: NaiveDateTime, zone: DisplayZone) -> RainStats {
    let mut stats = RainStats::default();

    for reading in readings {
        let Some(rain) = reading.rain_cm else { continue };
        let Some(time) = zone.parse_timestamp(&reading.timestamp) else { continue };

        if time >= now - Duration::hours(1) {
            stats.last_hour += rain;
        }
        if time >= now - Duration::hours(24) {
            stats.last_day += rain;
        }
        if time >= now - Duration::days(7) {
            stats.last_week += rain;
        }
        if time >= now - Duration::days(15) {
            stats.last_fortnight += rain;
        }
        if time >= now - Duration::days(30) {
            stats.last_month += rain;
        }
    }

    stats
}
