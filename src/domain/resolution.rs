// Chart resolution - How far bucket timestamps are truncated
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Spans up to this many days are charted hourly, longer ones daily.
pub const HOURLY_SPAN_LIMIT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Hourly,
    Daily,
}

impl Resolution {
    /// Pick the resolution for a requested time span
    pub fn for_span(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end - start <= Duration::days(HOURLY_SPAN_LIMIT_DAYS) {
            Resolution::Hourly
        } else {
            Resolution::Daily
        }
    }

    /// Zero every component finer than this resolution
    pub fn truncate(&self, time: NaiveDateTime) -> NaiveDateTime {
        let midnight = time.date().and_time(NaiveTime::MIN);
        match self {
            Resolution::Hourly => midnight + Duration::hours(i64::from(time.hour())),
            Resolution::Daily => midnight,
        }
    }
}
