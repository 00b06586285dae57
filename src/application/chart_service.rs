// Chart service - Use case for building a probe's soil chart
use crate::application::probe_repository::{HistoryWindow, ProbeRepository};
use crate::domain::chart::{chart_points, depth_fields, ProbeChart};
use crate::domain::reading::{Metric, RawReading};
use crate::domain::resolution::Resolution;
use crate::domain::smoothing::smooth;
use crate::domain::viewport::{ChartWindow, Zoom};
use crate::domain::zone::DisplayZone;
use crate::infrastructure::config::ChartSettings;
use chrono::NaiveDateTime;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRequest {
    pub metric: Metric,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Overrides the span-based choice
    pub resolution: Option<Resolution>,
    pub radius: Option<usize>,
    /// Window the client is currently showing
    pub window: Option<(usize, usize)>,
    pub zoom: Option<Zoom>,
}

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn ProbeRepository>,
    settings: ChartSettings,
    zone: DisplayZone,
}

impl ChartService {
    pub fn new(repository: Arc<dyn ProbeRepository>, settings: ChartSettings, zone: DisplayZone) -> Self {
        Self {
            repository,
            settings,
            zone,
        }
    }

    pub async fn probe_chart(&self, esn: &str, request: &ChartRequest) -> anyhow::Result<ProbeChart> {
        let window = HistoryWindow {
            start: request.start,
            end: request.end,
            limit: self.settings.history_limit,
        };

        let readings = self.repository.reading_history(esn, &window).await?;
        tracing::debug!("Fetched {} readings for probe {}", readings.len(), esn);

        Ok(self.build_chart(esn, request, &readings))
    }

    fn build_chart(&self, esn: &str, request: &ChartRequest, readings: &[RawReading]) -> ProbeChart {
        let resolution = request
            .resolution
            .unwrap_or_else(|| self.resolution_for(request, readings));

        let points = chart_points(readings, request.metric, resolution, self.zone);
        let fields = depth_fields(&points);
        let radius = request.radius.unwrap_or(self.settings.smoothing_radius);
        let points = smooth(&points, &fields, radius);

        let mut window = match request.window {
            Some((start, end)) => ChartWindow::clamped(start, end, points.len()),
            None => ChartWindow::initial(&points, self.settings.initial_window_days),
        };
        if let Some(zoom) = request.zoom {
            window = window.apply(zoom, points.len());
        }

        ProbeChart {
            esn: esn.to_string(),
            metric: request.metric,
            unit: request.metric.unit(),
            resolution,
            smoothing_radius: radius,
            fields,
            points,
            window,
        }
    }

    /// Resolution from the requested span; open ends are taken from the data
    fn resolution_for(&self, request: &ChartRequest, readings: &[RawReading]) -> Resolution {
        let times = || {
            readings
                .iter()
                .filter_map(|r| self.zone.parse_timestamp(&r.timestamp))
        };

        let start = request.start.or_else(|| times().min());
        let end = request.end.or_else(|| times().max());

        match (start, end) {
            (Some(start), Some(end)) => Resolution::for_span(start, end),
            _ => Resolution::Hourly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::probe_repository::fake::FakeProbeRepository;
    use crate::domain::chart::RAIN_FIELD;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn service(history: Vec<RawReading>) -> (ChartService, Arc<FakeProbeRepository>) {
        let mut repo = FakeProbeRepository::default();
        repo.history.insert("0-100".to_string(), history);
        let repo = Arc::new(repo);
        let service = ChartService::new(repo.clone(), ChartSettings::default(), DisplayZone::utc());
        (service, repo)
    }

    #[tokio::test]
    async fn test_hourly_chart_is_bucketed_and_smoothed() {
        let (service, repo) = service(vec![
            RawReading::new("2024-03-01T10:05:00", 10).with_moisture(40.0),
            RawReading::new("2024-03-01T10:40:00", 10).with_moisture(44.0),
            RawReading::new("2024-03-01T11:10:00", 10).with_moisture(48.0).with_rain(0.4),
            RawReading::new("2024-03-01T12:10:00", 10).with_moisture(54.0),
        ]);

        let chart = service.probe_chart("0-100", &ChartRequest::default()).await.unwrap();

        assert_eq!(chart.resolution, Resolution::Hourly);
        assert_eq!(chart.fields, vec!["depth10"]);
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[0].time, at("2024-03-01 10:00:00"));
        // raw hourly means 42, 48, 54 smoothed with radius 1
        assert_eq!(chart.points[0].get("depth10"), Some(45.0));
        assert_eq!(chart.points[1].get("depth10"), Some(48.0));
        assert_eq!(chart.points[2].get("depth10"), Some(51.0));
        // rain is a total, not smoothed
        assert_eq!(chart.points[1].get(RAIN_FIELD), Some(0.4));
        assert_eq!(chart.window, ChartWindow { start_index: 0, end_index: 2 });

        let calls = repo.history_calls.lock().unwrap();
        assert_eq!(calls[0].1.limit, 2000);
    }

    #[tokio::test]
    async fn test_long_span_charts_daily() {
        let (service, _) = service(vec![
            RawReading::new("2024-03-01T10:00:00", 10).with_moisture(40.0),
            RawReading::new("2024-03-01T22:00:00", 10).with_moisture(50.0),
            RawReading::new("2024-03-20T10:00:00", 10).with_moisture(30.0),
        ]);

        let request = ChartRequest {
            radius: Some(0),
            ..Default::default()
        };
        let chart = service.probe_chart("0-100", &request).await.unwrap();

        assert_eq!(chart.resolution, Resolution::Daily);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].get("depth10"), Some(45.0));
    }

    #[tokio::test]
    async fn test_explicit_resolution_and_window_passed_through() {
        let (service, repo) = service(vec![
            RawReading::new("2024-03-01T10:00:00", 10).with_temperature(20.0),
            RawReading::new("2024-03-01T11:00:00", 10).with_temperature(22.0),
        ]);

        let request = ChartRequest {
            metric: Metric::Temperature,
            start: Some(at("2024-02-01 00:00:00")),
            end: Some(at("2024-03-02 00:00:00")),
            resolution: Some(Resolution::Hourly),
            zoom: Some(Zoom::Reset),
            ..Default::default()
        };
        let chart = service.probe_chart("0-100", &request).await.unwrap();

        assert_eq!(chart.resolution, Resolution::Hourly);
        assert_eq!(chart.unit, "°C");
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.window, ChartWindow::full(2));

        let calls = repo.history_calls.lock().unwrap();
        assert_eq!(calls[0].1.start, Some(at("2024-02-01 00:00:00")));
    }

    #[tokio::test]
    async fn test_unknown_probe_propagates() {
        let (service, _) = service(vec![]);
        assert!(service.probe_chart("missing", &ChartRequest::default()).await.is_err());
    }
}
