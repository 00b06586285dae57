// HTTP request handlers
use crate::application::chart_service::ChartRequest;
use crate::domain::farm::NewFarm;
use crate::domain::probe::NewProbe;
use crate::domain::reading::Metric;
use crate::domain::resolution::Resolution;
use crate::domain::thresholds::MoistureRange;
use crate::domain::user::{Credentials, NewAccount, Viewer};
use crate::domain::viewport::Zoom;
use crate::domain::zone::DisplayZone;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest smoothing radius a client may ask for
pub const MAX_RADIUS: usize = 48;

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub metric: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub resolution: Option<String>,
    pub radius: Option<usize>,
    pub window_start: Option<usize>,
    pub window_end: Option<usize>,
    pub zoom: Option<String>,
}

impl ChartQuery {
    pub fn into_request(self, zone: DisplayZone) -> Result<ChartRequest, ApiError> {
        let metric = parse_choice::<Metric>("metric", self.metric.as_deref())?.unwrap_or_default();
        let resolution = parse_choice::<Resolution>("resolution", self.resolution.as_deref())?;
        let zoom = parse_choice::<Zoom>("zoom", self.zoom.as_deref())?;
        let start = parse_time("start", self.start.as_deref(), zone)?;
        let end = parse_time("end", self.end.as_deref(), zone)?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ApiError::BadRequest(format!("start {} is after end {}", start, end)));
            }
        }
        if let Some(radius) = self.radius {
            if radius > MAX_RADIUS {
                return Err(ApiError::BadRequest(format!("radius must be at most {}", MAX_RADIUS)));
            }
        }

        let window = match (self.window_start, self.window_end) {
            (Some(s), Some(e)) => Some((s, e)),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "window_start and window_end must be given together".to_string(),
                ))
            }
        };

        Ok(ChartRequest {
            metric,
            start,
            end,
            resolution,
            radius: self.radius,
            window,
            zoom,
        })
    }
}

/// Lowercase enum names from a query string
fn parse_choice<T: DeserializeOwned>(name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("unknown {}: {}", name, raw)))
}

fn parse_time(name: &str, raw: Option<&str>, zone: DisplayZone) -> Result<Option<NaiveDateTime>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    zone.parse_timestamp(raw)
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid {} timestamp: {}", name, raw)))
}

#[derive(Debug, Deserialize)]
pub struct FarmOwner {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
struct Registered {
    user_id: i64,
}

async fn respond<T: Serialize>(value: &T, headers: &HeaderMap) -> Result<Response<Body>, ApiError> {
    Ok(json_response(value, accepts_brotli(headers)).await?)
}

async fn created<T: Serialize>(value: &T, headers: &HeaderMap) -> Result<Response<Body>, ApiError> {
    let mut response = respond(value, headers).await?;
    *response.status_mut() = StatusCode::CREATED;
    Ok(response)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Result<Response<Body>, ApiError> {
    let user = state.account_service.login(&credentials).await?;
    respond(&user, &headers).await
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(account): Json<NewAccount>,
) -> Result<Response<Body>, ApiError> {
    let user_id = state.account_service.register(&account).await?;
    created(&Registered { user_id }, &headers).await
}

/// Probe summaries for the list and map views
pub async fn list_probes(
    State(state): State<Arc<AppState>>,
    Query(viewer): Query<Viewer>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let probes = state.probe_service.list_probes(&viewer).await?;
    respond(&probes, &headers).await
}

pub async fn create_probe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(probe): Json<NewProbe>,
) -> Result<Response<Body>, ApiError> {
    probe.validate().map_err(ApiError::BadRequest)?;
    let created_probe = state.probe_service.create_probe(&probe).await?;
    created(&created_probe, &headers).await
}

pub async fn list_farms(
    State(state): State<Arc<AppState>>,
    Query(viewer): Query<Viewer>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let farms = state.probe_service.list_farms(&viewer).await?;
    respond(&farms, &headers).await
}

pub async fn create_farm(
    State(state): State<Arc<AppState>>,
    Query(owner): Query<FarmOwner>,
    headers: HeaderMap,
    Json(farm): Json<NewFarm>,
) -> Result<Response<Body>, ApiError> {
    farm.validate().map_err(ApiError::BadRequest)?;
    let created_farm = state.probe_service.create_farm(owner.user_id, &farm).await?;
    created(&created_farm, &headers).await
}

/// Bucketed and smoothed chart for one probe
pub async fn probe_chart(
    State(state): State<Arc<AppState>>,
    Path(esn): Path<String>,
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let request = query.into_request(state.zone)?;
    let chart = state.chart_service.probe_chart(&esn, &request).await?;
    respond(&chart, &headers).await
}

/// Live chart stream (progressive loading, periodic refresh)
pub async fn live_chart(
    State(state): State<Arc<AppState>>,
    Path(esn): Path<String>,
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.into_request(state.zone)?;
    let rx = state.live_service.stream_chart(&esn, request).await;
    Ok(stream_from_receiver(rx, accepts_brotli(&headers)))
}

pub async fn get_thresholds(
    State(state): State<Arc<AppState>>,
    Path(esn): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let range = state.threshold_service.current(&esn)?;
    respond(&range, &headers).await
}

pub async fn put_thresholds(
    State(state): State<Arc<AppState>>,
    Path(esn): Path<String>,
    headers: HeaderMap,
    Json(range): Json<MoistureRange>,
) -> Result<Response<Body>, ApiError> {
    let update = state.threshold_service.update(&esn, range.min, range.max).await?;
    respond(&update, &headers).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_query_defaults() {
        let request = ChartQuery::default().into_request(DisplayZone::utc()).unwrap();
        assert_eq!(request, ChartRequest::default());
    }

    #[test]
    fn test_chart_query_parses_choices() {
        let query = ChartQuery {
            metric: Some("Temperature".to_string()),
            resolution: Some("daily".to_string()),
            zoom: Some("in".to_string()),
            start: Some("2024-03-01".to_string()),
            radius: Some(2),
            ..Default::default()
        };
        let request = query.into_request(DisplayZone::utc()).unwrap();

        assert_eq!(request.metric, Metric::Temperature);
        assert_eq!(request.resolution, Some(Resolution::Daily));
        assert_eq!(request.zoom, Some(Zoom::In));
        assert_eq!(request.radius, Some(2));
        assert!(request.start.is_some());
    }

    #[test]
    fn test_chart_query_rejects_bad_input() {
        let bad = [
            ChartQuery {
                metric: Some("humidity".to_string()),
                ..Default::default()
            },
            ChartQuery {
                start: Some("yesterday".to_string()),
                ..Default::default()
            },
            ChartQuery {
                start: Some("2024-03-02".to_string()),
                end: Some("2024-03-01".to_string()),
                ..Default::default()
            },
            ChartQuery {
                radius: Some(MAX_RADIUS + 1),
                ..Default::default()
            },
            ChartQuery {
                window_start: Some(3),
                ..Default::default()
            },
        ];

        for query in bad {
            let err = query.into_request(DisplayZone::utc()).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
