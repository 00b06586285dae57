// Display time zone - All chart math runs on wall-clock time in this zone
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

/// Naive layouts the backend and the dashboard emit, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    /// Server local time
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn from_offset_minutes(minutes: Option<i32>) -> anyhow::Result<Self> {
        match minutes {
            None => Ok(Self::Local),
            Some(m) => FixedOffset::east_opt(m * 60)
                .map(Self::Fixed)
                .ok_or_else(|| anyhow::anyhow!("UTC offset out of range: {} minutes", m)),
        }
    }

    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Current wall-clock time in this zone
    pub fn now(&self) -> NaiveDateTime {
        self.to_wall_clock(Utc::now().fixed_offset())
    }

    /// Parse a backend timestamp into wall-clock time in this zone.
    ///
    /// Timestamps carrying an offset are converted; naive ones are taken as
    /// already being wall-clock time here. Returns `None` for anything that
    /// does not parse.
    pub fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(self.to_wall_clock(with_offset));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    }

    fn to_wall_clock(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime {
        match self {
            Self::Local => instant.with_timezone(&Local).naive_local(),
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_naive_formats() {
        let zone = DisplayZone::utc();
        assert_eq!(zone.parse_timestamp("2024-03-01T10:05:00"), Some(at("2024-03-01 10:05:00")));
        assert_eq!(
            zone.parse_timestamp("2024-03-01T10:05:00.250").map(|t| t.and_utc().timestamp_millis()),
            Some(at("2024-03-01 10:05:00").and_utc().timestamp_millis() + 250)
        );
        assert_eq!(zone.parse_timestamp("2024-03-01 10:05"), Some(at("2024-03-01 10:05:00")));
        assert_eq!(zone.parse_timestamp("01/03/2024 10:05"), Some(at("2024-03-01 10:05:00")));
        assert_eq!(zone.parse_timestamp("2024-03-01"), Some(at("2024-03-01 00:00:00")));
    }

    #[test]
    fn test_parse_with_offset_converts_to_zone() {
        let zone = DisplayZone::from_offset_minutes(Some(-180)).unwrap();
        assert_eq!(
            zone.parse_timestamp("2024-03-01T13:05:00Z"),
            Some(at("2024-03-01 10:05:00"))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let zone = DisplayZone::utc();
        assert_eq!(zone.parse_timestamp(""), None);
        assert_eq!(zone.parse_timestamp("yesterday"), None);
        assert_eq!(zone.parse_timestamp("2024-13-45T99:00:00"), None);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(DisplayZone::from_offset_minutes(Some(24 * 60)).is_err());
        assert_eq!(DisplayZone::from_offset_minutes(None).unwrap(), DisplayZone::Local);
    }
}
