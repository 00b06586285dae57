// Probe service - Use cases for the probe list, map and farm management
use crate::application::probe_repository::ProbeRepository;
use crate::application::threshold_service::ThresholdService;
use crate::domain::farm::{Farm, NewFarm};
use crate::domain::probe::{latest_by_depth, NewProbe, Probe, ProbeSummary};
use crate::domain::rain::rain_stats;
use crate::domain::user::Viewer;
use crate::domain::zone::DisplayZone;
use std::sync::Arc;

#[derive(Clone)]
pub struct ProbeService {
    repository: Arc<dyn ProbeRepository>,
    thresholds: ThresholdService,
    zone: DisplayZone,
}

impl ProbeService {
    pub fn new(repository: Arc<dyn ProbeRepository>, thresholds: ThresholdService, zone: DisplayZone) -> Self {
        Self {
            repository,
            thresholds,
            zone,
        }
    }

    pub async fn list_probes(&self, viewer: &Viewer) -> anyhow::Result<Vec<ProbeSummary>> {
        let probes = self.repository.list_probes(viewer).await?;
        let now = self.zone.now();

        Ok(probes
            .into_iter()
            .map(|probe| {
                let thresholds = self.thresholds.current(&probe.esn).unwrap_or_else(|e| {
                    tracing::warn!("Falling back to default thresholds for {}: {}", probe.esn, e);
                    Default::default()
                });
                let profile = latest_by_depth(&probe.readings, thresholds, self.zone);
                let rain = rain_stats(&probe.readings, now, self.zone);

                ProbeSummary {
                    probe,
                    thresholds,
                    profile,
                    rain,
                }
            })
            .collect())
    }

    pub async fn create_probe(&self, probe: &NewProbe) -> anyhow::Result<Probe> {
        let created = self.repository.create_probe(probe).await?;
        tracing::info!("Registered probe {} on farm {}", created.esn, probe.farm_id);
        Ok(created)
    }

    pub async fn list_farms(&self, viewer: &Viewer) -> anyhow::Result<Vec<Farm>> {
        self.repository.list_farms(viewer).await
    }

    pub async fn create_farm(&self, user_id: i64, farm: &NewFarm) -> anyhow::Result<Farm> {
        self.repository.create_farm(user_id, farm).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::probe_repository::fake::FakeProbeRepository;
    use crate::application::settings_store::memory::InMemorySettingsStore;
    use crate::domain::probe::{ProbeRecord, ProbeStatus};
    use crate::domain::reading::RawReading;
    use crate::domain::thresholds::{MoistureRange, MoistureZone};
    use crate::domain::user::Role;

    fn probe(esn: &str, readings: Vec<RawReading>) -> Probe {
        ProbeRecord {
            id: 1,
            esn: esn.to_string(),
            status: Some("status_ok".to_string()),
            readings: Some(readings),
            ..Default::default()
        }
        .into()
    }

    fn service(repo: FakeProbeRepository) -> (ProbeService, Arc<FakeProbeRepository>, ThresholdService) {
        let repo = Arc::new(repo);
        let thresholds = ThresholdService::new(repo.clone(), Arc::new(InMemorySettingsStore::default()));
        let service = ProbeService::new(repo.clone(), thresholds.clone(), DisplayZone::utc());
        (service, repo, thresholds)
    }

    #[tokio::test]
    async fn test_summaries_use_probe_thresholds() {
        let (service, _, thresholds) = service(FakeProbeRepository {
            probes: vec![
                probe("0-1", vec![RawReading::new("2024-03-01T10:00:00", 10).with_moisture(35.0)]),
                probe("0-2", vec![RawReading::new("2024-03-01T10:00:00", 10).with_moisture(35.0)]),
            ],
            ..Default::default()
        });
        thresholds.update("0-2", 20, 40).await.unwrap();

        let summaries = service.list_probes(&Viewer::default()).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].probe.status, ProbeStatus::Ok);
        assert_eq!(summaries[0].profile[0].zone, MoistureZone::Dry);
        assert_eq!(summaries[1].thresholds, MoistureRange { min: 20, max: 40 });
        assert_eq!(summaries[1].profile[0].zone, MoistureZone::Ideal);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_viewer() {
        let (service, repo, _) = service(FakeProbeRepository::default());

        let farmer = Viewer { user_id: Some(9), role: Some(Role::Fazendeiro) };
        let admin = Viewer { user_id: Some(1), role: Some(Role::Admin) };
        service.list_probes(&farmer).await.unwrap();
        service.list_probes(&admin).await.unwrap();

        assert_eq!(repo.listed_for.lock().unwrap().as_slice(), &[Some(9), None]);
    }

    #[tokio::test]
    async fn test_farms_filtered_for_non_admin() {
        let farm = |id, user_id| Farm {
            id,
            name: format!("Fazenda {}", id),
            location: None,
            user_id,
        };
        let (service, _, _) = service(FakeProbeRepository {
            farms: vec![farm(1, 9), farm(2, 3)],
            ..Default::default()
        });

        let farmer = Viewer { user_id: Some(9), role: Some(Role::Fazendeiro) };
        let farms = service.list_farms(&farmer).await.unwrap();

        assert_eq!(farms.len(), 1);
        assert_eq!(farms[0].id, 1);
    }
}
