// Bucketing engine - Groups raw readings by truncated timestamp and depth
use super::reading::{Metric, RawReading};
use super::resolution::Resolution;
use super::zone::DisplayZone;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Running sum and count for one depth channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelSum {
    pub sum: f64,
    pub count: u32,
}

impl ChannelSum {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Truncated wall-clock time in the display zone
    pub time: NaiveDateTime,
    /// Keyed by depth in centimetres
    pub channels: BTreeMap<i32, ChannelSum>,
    /// Plain rainfall sum; `None` when no reading in the bucket carried rain
    pub rain_cm: Option<f64>,
}

impl Bucket {
    fn new(time: NaiveDateTime) -> Self {
        Self {
            time,
            channels: BTreeMap::new(),
            rain_cm: None,
        }
    }

    pub fn mean(&self, depth_cm: i32) -> Option<f64> {
        self.channels.get(&depth_cm).and_then(ChannelSum::mean)
    }
}

/// Aggregate readings into buckets sorted by ascending time.
///
/// Readings whose timestamp does not parse are skipped. Input order does not
/// matter.
pub fn bucket_readings(
    readings: &[RawReading],
    metric: Metric,
    resolution: Resolution,
    zone: DisplayZone,
) -> Vec<Bucket> {
    let mut buckets: BTreeMap<NaiveDateTime, Bucket> = BTreeMap::new();
    let mut dropped = 0usize;

    for reading in readings {
        let Some(time) = zone.parse_timestamp(&reading.timestamp) else {
            dropped += 1;
            continue;
        };

        let key = resolution.truncate(time);
        let bucket = buckets.entry(key).or_insert_with(|| Bucket::new(key));

        if let (Some(depth), Some(value)) = (reading.depth_cm, metric.value_of(reading)) {
            bucket.channels.entry(depth).or_default().push(value);
        }

        if let Some(rain) = reading.rain_cm {
            *bucket.rain_cm.get_or_insert(0.0) += rain;
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} readings with unparsable timestamps", dropped);
    }

    buckets.into_values().collect()
}
