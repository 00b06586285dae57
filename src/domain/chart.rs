// Chart points - The shape handed to chart renderers
use super::bucketing::{bucket_readings, Bucket};
use super::reading::{Metric, RawReading};
use super::resolution::Resolution;
use super::viewport::ChartWindow;
use super::zone::DisplayZone;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const RAIN_FIELD: &str = "rain";

pub fn depth_field(depth_cm: i32) -> String {
    format!("depth{}", depth_cm)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: NaiveDateTime,
    /// `depth{cm}` averages and the `rain` total; absent keys mean no data
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}

impl ChartPoint {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: f64) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    fn from_bucket(bucket: &Bucket) -> Self {
        let mut point = Self::new(bucket.time);
        for depth in bucket.channels.keys() {
            if let Some(mean) = bucket.mean(*depth) {
                point.fields.insert(depth_field(*depth), mean);
            }
        }
        if let Some(rain) = bucket.rain_cm {
            point.fields.insert(RAIN_FIELD.to_string(), rain);
        }
        point
    }
}

/// Bucketed chart points, ascending by time
pub fn chart_points(
    readings: &[RawReading],
    metric: Metric,
    resolution: Resolution,
    zone: DisplayZone,
) -> Vec<ChartPoint> {
    bucket_readings(readings, metric, resolution, zone)
        .iter()
        .map(ChartPoint::from_bucket)
        .collect()
}

/// Every depth field present in the series, ordered by depth
pub fn depth_fields(points: &[ChartPoint]) -> Vec<String> {
    let depths: BTreeSet<i32> = points
        .iter()
        .flat_map(|p| p.fields.keys())
        .filter_map(|k| k.strip_prefix("depth"))
        .filter_map(|d| d.parse().ok())
        .collect();

    depths.into_iter().map(depth_field).collect()
}

/// A probe's chart as served to the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ProbeChart {
    pub esn: String,
    pub metric: Metric,
    pub unit: &'static str,
    pub resolution: Resolution,
    pub smoothing_radius: usize,
    pub fields: Vec<String>,
    pub points: Vec<ChartPoint>,
    pub window: ChartWindow,
}
