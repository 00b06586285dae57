// Threshold service - Use case for reading and editing moisture zone bounds
use crate::application::probe_repository::ProbeRepository;
use crate::application::settings_store::SettingsStore;
use crate::domain::thresholds::MoistureRange;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdUpdate {
    pub range: MoistureRange,
    /// Whether the backend device config accepted the new bounds
    pub synced: bool,
}

#[derive(Clone)]
pub struct ThresholdService {
    repository: Arc<dyn ProbeRepository>,
    store: Arc<dyn SettingsStore>,
}

impl ThresholdService {
    pub fn new(repository: Arc<dyn ProbeRepository>, store: Arc<dyn SettingsStore>) -> Self {
        Self { repository, store }
    }

    pub fn current(&self, esn: &str) -> anyhow::Result<MoistureRange> {
        Ok(self.store.load_thresholds(esn)?.unwrap_or_default())
    }

    /// Validate, persist locally, then push to the backend. A failed push
    /// keeps the local edit and reports `synced: false`.
    pub async fn update(&self, esn: &str, min: u8, max: u8) -> anyhow::Result<ThresholdUpdate> {
        let range = MoistureRange::new(min, max)?;
        self.store.save_thresholds(esn, range)?;

        let synced = match self.repository.update_thresholds(esn, range).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to push thresholds for probe {}: {}", esn, e);
                false
            }
        };

        Ok(ThresholdUpdate { range, synced })
    }
}
