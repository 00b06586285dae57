// Raw probe readings as delivered by the backend history endpoint
use serde::{Deserialize, Deserializer, Serialize};

/// One flat measurement record for a single depth of a probe.
///
/// Numeric fields are lenient: anything that is not a finite JSON number is
/// read as absent instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: String,
    /// Sensor depth, rounded to whole centimetres. Readings without a depth
    /// only feed rainfall.
    #[serde(default, deserialize_with = "lenient_depth")]
    pub depth_cm: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub moisture_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rain_cm: Option<f64>,
}

impl RawReading {
    pub fn new(timestamp: impl Into<String>, depth_cm: i32) -> Self {
        Self {
            timestamp: timestamp.into(),
            depth_cm: Some(depth_cm),
            moisture_pct: None,
            temperature_c: None,
            rain_cm: None,
        }
    }

    pub fn with_moisture(mut self, value: f64) -> Self {
        self.moisture_pct = Some(value);
        self
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature_c = Some(value);
        self
    }

    pub fn with_rain(mut self, value: f64) -> Self {
        self.rain_cm = Some(value);
        self
    }
}

/// Which reading field feeds the per-depth chart channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Moisture,
    Temperature,
}

impl Metric {
    pub fn value_of(&self, reading: &RawReading) -> Option<f64> {
        match self {
            Metric::Moisture => reading.moisture_pct,
            Metric::Temperature => reading.temperature_c,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Moisture => "%",
            Metric::Temperature => "°C",
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_depth<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.map(|v| v.round() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_history_row() {
        let json = r#"{
            "timestamp": "2024-03-01T10:05:00",
            "depth_cm": 20.0,
            "moisture_pct": 41.5,
            "temperature_c": 22.1
        }"#;
        let reading: RawReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.depth_cm, Some(20));
        assert_eq!(reading.moisture_pct, Some(41.5));
        assert_eq!(reading.temperature_c, Some(22.1));
        assert_eq!(reading.rain_cm, None);
    }

    #[test]
    fn test_non_numeric_values_are_absent() {
        let json = r#"{
            "timestamp": "2024-03-01T10:05:00",
            "depth_cm": null,
            "moisture_pct": "n/a",
            "temperature_c": true,
            "rain_cm": null
        }"#;
        let reading: RawReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.depth_cm, None);
        assert_eq!(reading.moisture_pct, None);
        assert_eq!(reading.temperature_c, None);
        assert_eq!(reading.rain_cm, None);
    }

    #[test]
    fn test_metric_selects_field() {
        let reading = RawReading::new("2024-03-01T10:05:00", 10)
            .with_moisture(40.0)
            .with_temperature(19.5);

        assert_eq!(Metric::Moisture.value_of(&reading), Some(40.0));
        assert_eq!(Metric::Temperature.value_of(&reading), Some(19.5));
        assert_eq!(serde_json::to_string(&Metric::Temperature).unwrap(), "\"temperature\"");
    }
}
