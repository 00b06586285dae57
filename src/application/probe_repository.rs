// Repository trait for probe backend access
use crate::domain::farm::{Farm, NewFarm};
use crate::domain::probe::{NewProbe, Probe};
use crate::domain::reading::RawReading;
use crate::domain::thresholds::MoistureRange;
use crate::domain::user::{Credentials, NewAccount, SessionUser, Viewer};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Failures the backend reports through its status codes
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("backend returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Time window and row cap for a history fetch
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub limit: usize,
}

#[async_trait]
pub trait ProbeRepository: Send + Sync {
    /// List probes visible to the viewer, with their recent readings
    async fn list_probes(&self, viewer: &Viewer) -> anyhow::Result<Vec<Probe>>;

    /// List farms visible to the viewer
    async fn list_farms(&self, viewer: &Viewer) -> anyhow::Result<Vec<Farm>>;

    async fn create_farm(&self, user_id: i64, farm: &NewFarm) -> anyhow::Result<Farm>;

    async fn create_probe(&self, probe: &NewProbe) -> anyhow::Result<Probe>;

    /// Raw reading history for one probe
    async fn reading_history(&self, esn: &str, window: &HistoryWindow) -> anyhow::Result<Vec<RawReading>>;

    /// Push moisture zone bounds into the probe's device config
    async fn update_thresholds(&self, esn: &str, range: MoistureRange) -> anyhow::Result<()>;

    async fn login(&self, credentials: &Credentials) -> anyhow::Result<SessionUser>;

    /// Returns the id of the new account
    async fn register(&self, account: &NewAccount) -> anyhow::Result<i64>;
}
