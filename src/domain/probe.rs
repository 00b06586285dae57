// Probe domain model - Resolved once at the ingestion boundary
use super::rain::RainStats;
use super::reading::RawReading;
use super::thresholds::{MoistureRange, MoistureZone};
use super::zone::DisplayZone;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Alert,
    Critical,
    Saturated,
    Offline,
}

impl ProbeStatus {
    /// Map any of the status spellings the backend has used onto one variant.
    /// Unknown or missing values are treated as offline.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        let code = lower.strip_prefix("status_").unwrap_or(&lower);

        match code {
            "ok" | "ideal" | "ativo" | "online" => ProbeStatus::Ok,
            "alert" | "attention" | "atenção" | "atencao" => ProbeStatus::Alert,
            "critical" | "stress" | "estresse" | "deficit" | "crítico" | "critico" => ProbeStatus::Critical,
            "saturated" | "saturado" => ProbeStatus::Saturated,
            _ if code.contains("online") => ProbeStatus::Ok,
            _ => ProbeStatus::Offline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Probe as the backend sends it, with every historical field spelling
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeRecord {
    pub id: i64,
    pub esn: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub farm_id: Option<i64>,
    #[serde(default, rename = "statusCode", alias = "status_code")]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
    #[serde(default, alias = "last_seen")]
    pub last_communication: Option<String>,
    #[serde(default)]
    pub readings: Option<Vec<RawReading>>,
    #[serde(default)]
    pub measurements: Option<Vec<RawReading>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub id: i64,
    pub esn: String,
    pub name: String,
    pub location: Option<String>,
    pub farm_id: Option<i64>,
    pub status: ProbeStatus,
    pub position: Option<GeoPoint>,
    pub last_communication: Option<String>,
    #[serde(skip)]
    pub readings: Vec<RawReading>,
}

impl From<ProbeRecord> for Probe {
    fn from(record: ProbeRecord) -> Self {
        let status = record
            .status_code
            .as_deref()
            .or(record.status.as_deref())
            .map(ProbeStatus::parse)
            .unwrap_or(ProbeStatus::Offline);

        let position = match (record.latitude, record.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        // Probes without a display name are shown by ESN
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| record.esn.clone());

        Self {
            id: record.id,
            esn: record.esn,
            name,
            location: record.location,
            farm_id: record.farm_id,
            status,
            position,
            last_communication: record.last_communication,
            readings: record.readings.or(record.measurements).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProbe {
    pub esn: String,
    pub name: String,
    pub farm_id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl NewProbe {
    pub fn validate(&self) -> Result<(), String> {
        if self.esn.trim().is_empty() || self.name.trim().is_empty() {
            return Err("probe name and ESN are required".to_string());
        }
        if let Some(lat) = self.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude out of range: {}", lat));
            }
        }
        if let Some(lng) = self.lng {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(format!("longitude out of range: {}", lng));
            }
        }
        Ok(())
    }
}

/// Newest moisture value at one depth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthReading {
    pub depth_cm: i32,
    pub moisture_pct: f64,
    pub time: NaiveDateTime,
    pub zone: MoistureZone,
}

/// Latest moisture reading per depth, shallowest first
pub fn latest_by_depth(readings: &[RawReading], range: MoistureRange, zone: DisplayZone) -> Vec<DepthReading> {
    let mut latest: BTreeMap<i32, (NaiveDateTime, f64)> = BTreeMap::new();

    for reading in readings {
        let (Some(depth), Some(moisture)) = (reading.depth_cm, reading.moisture_pct) else {
            continue;
        };
        let Some(time) = zone.parse_timestamp(&reading.timestamp) else {
            continue;
        };

        latest
            .entry(depth)
            .and_modify(|current| {
                if time > current.0 {
                    *current = (time, moisture);
                }
            })
            .or_insert((time, moisture));
    }

    latest
        .into_iter()
        .map(|(depth_cm, (time, moisture_pct))| DepthReading {
            depth_cm,
            moisture_pct,
            time,
            zone: range.classify(moisture_pct),
        })
        .collect()
}

/// Everything the probe list and map need for one probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSummary {
    #[serde(flatten)]
    pub probe: Probe,
    pub thresholds: MoistureRange,
    pub profile: Vec<DepthReading>,
    pub rain: RainStats,
}
