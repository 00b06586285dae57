// Probe backend HTTP client
use crate::application::probe_repository::{BackendError, HistoryWindow, ProbeRepository};
use crate::domain::farm::{Farm, NewFarm};
use crate::domain::probe::{NewProbe, Probe, ProbeRecord};
use crate::domain::reading::RawReading;
use crate::domain::thresholds::MoistureRange;
use crate::domain::user::{Credentials, NewAccount, SessionUser, Viewer};
use crate::infrastructure::config::BackendSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct HttpProbeBackend {
    base_url: String,
    client: reqwest::Client,
}

/// Older deployments wrap lists in an envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Bare(Vec<T>),
    Probes { probes: Vec<T> },
    Readings { readings: Vec<T> },
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) => items,
            ListPayload::Probes { probes } => probes,
            ListPayload::Readings { readings } => readings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    user_id: i64,
}

#[derive(Debug, Serialize)]
struct DeviceConfigPatch {
    pwp_vwc_pct: u8,
    fc_vwc_pct: u8,
}

impl HttpProbeBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn scoped_url(&self, path: &str, viewer: &Viewer) -> String {
        match viewer.scope_user_id() {
            Some(user_id) => format!("{}?user_id={}", self.url(path), user_id),
            None => self.url(path),
        }
    }

    fn history_url(&self, esn: &str, window: &HistoryWindow) -> String {
        let mut params = vec![format!("limit={}", window.limit)];
        if let Some(start) = window.start {
            params.push(format!("start_date={}", urlencoding::encode(&start.format(BACKEND_TIME_FORMAT).to_string())));
        }
        if let Some(end) = window.end {
            params.push(format!("end_date={}", urlencoding::encode(&end.format(BACKEND_TIME_FORMAT).to_string())));
        }

        format!(
            "{}?{}",
            self.url(&format!("/device/{}/history", urlencoding::encode(esn))),
            params.join("&")
        )
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body).into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach backend for {}", what))?;

        Self::read_json(response, what).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B, what: &str) -> Result<T> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend for {}", what))?;

        Self::read_json(response, what).await
    }
}

/// Map a non-success backend status onto a typed error
pub fn status_error(status: u16, body: String) -> BackendError {
    let detail = backend_detail(&body);
    match status {
        404 => BackendError::NotFound(detail),
        401 | 403 => BackendError::Unauthorized(detail),
        400 | 409 | 422 => BackendError::Rejected(detail),
        _ => BackendError::Upstream { status, body: detail },
    }
}

/// The backend reports errors as `{"detail": "..."}`; fall back to the raw body
fn backend_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ProbeRepository for HttpProbeBackend {
    async fn list_probes(&self, viewer: &Viewer) -> Result<Vec<Probe>> {
        let url = self.scoped_url("/devices", viewer);
        let payload: ListPayload<ProbeRecord> = self.get_json(&url, "device list").await?;
        let probes: Vec<Probe> = payload.into_vec().into_iter().map(Probe::from).collect();

        tracing::info!("Fetched {} probes", probes.len());
        Ok(probes)
    }

    async fn list_farms(&self, viewer: &Viewer) -> Result<Vec<Farm>> {
        let url = self.scoped_url("/farms", viewer);
        self.get_json(&url, "farm list").await
    }

    async fn create_farm(&self, user_id: i64, farm: &NewFarm) -> Result<Farm> {
        let url = format!("{}?user_id={}", self.url("/farms"), user_id);
        self.post_json(&url, farm, "farm creation").await
    }

    async fn create_probe(&self, probe: &NewProbe) -> Result<Probe> {
        let record: ProbeRecord = self.post_json(&self.url("/devices"), probe, "device creation").await?;
        Ok(record.into())
    }

    async fn reading_history(&self, esn: &str, window: &HistoryWindow) -> Result<Vec<RawReading>> {
        let url = self.history_url(esn, window);
        let payload: ListPayload<RawReading> = self.get_json(&url, "reading history").await?;
        let readings = payload.into_vec();

        tracing::debug!("Fetched {} readings for {}", readings.len(), esn);
        Ok(readings)
    }

    async fn update_thresholds(&self, esn: &str, range: MoistureRange) -> Result<()> {
        let url = self.url(&format!("/device/{}/config", urlencoding::encode(esn)));
        let patch = DeviceConfigPatch {
            pwp_vwc_pct: range.min,
            fc_vwc_pct: range.max,
        };

        let response = self
            .client
            .patch(&url)
            .json(&patch)
            .send()
            .await
            .context("Failed to reach backend for device config")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body).into());
        }
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionUser> {
        let response: LoginResponse = self.post_json(&self.url("/login"), credentials, "login").await?;
        Ok(response.user)
    }

    async fn register(&self, account: &NewAccount) -> Result<i64> {
        let response: RegisterResponse = self.post_json(&self.url("/register"), account, "registration").await?;
        Ok(response.user_id)
    }
}
