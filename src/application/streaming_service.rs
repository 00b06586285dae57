// Live chart service - Progressive loading and periodic refresh over a stream
use crate::application::chart_service::{ChartRequest, ChartService};
use crate::application::response_guard::ResponseGuard;
use crate::domain::chart::ProbeChart;
use crate::domain::reading::Metric;
use crate::infrastructure::config::LiveSettings;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Interval;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton {
        esn: String,
        metric: Metric,
        refresh_interval_secs: u64,
    },
    ChartUpdate {
        sequence: u64,
        chart: ProbeChart,
    },
    Error {
        message: String,
    },
    Complete {
        updates: u64,
        duration_ms: i64,
    },
}

#[derive(Clone)]
pub struct LiveChartService {
    charts: ChartService,
    settings: LiveSettings,
}

impl LiveChartService {
    pub fn new(charts: ChartService, settings: LiveSettings) -> Self {
        Self { charts, settings }
    }

    pub async fn stream_chart(&self, esn: &str, request: ChartRequest) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(16);
        let start_time = Instant::now();

        // 1. Skeleton first so the client can lay out the chart
        let skeleton = StreamMessage::Skeleton {
            esn: esn.to_string(),
            metric: request.metric,
            refresh_interval_secs: self.settings.refresh_interval_secs,
        };
        let _ = tx.send(skeleton).await;

        // 2. Refresh loop; each fetch runs as its own task and may finish out of order
        let charts = self.charts.clone();
        let esn = esn.to_string();
        let request = Arc::new(request);
        let interval = Duration::from_secs(self.settings.refresh_interval_secs.max(1));
        let max_refreshes = self.settings.max_refreshes;

        tokio::spawn(async move {
            let guard = Arc::new(ResponseGuard::new());
            let delivered = Arc::new(AtomicU64::new(0));
            let mut ticker = tokio::time::interval(interval);
            let mut pending = JoinSet::new();
            let mut issued = 0u64;

            loop {
                if max_refreshes > 0 && issued >= max_refreshes {
                    break;
                }

                if let Wake::Closed = next_wake(&tx, &mut ticker, &mut pending).await {
                    tracing::debug!("Live stream for {} closed by client", esn);
                    guard.invalidate();
                    pending.detach_all();
                    return;
                }

                issued += 1;
                let ticket = guard.issue();
                let tx = tx.clone();
                let guard = guard.clone();
                let delivered = delivered.clone();
                let charts = charts.clone();
                let request = request.clone();
                let esn = esn.clone();

                pending.spawn(async move {
                    let result = charts.probe_chart(&esn, &request).await;

                    if !guard.accept(ticket) {
                        tracing::debug!("Discarding stale chart response for {}", esn);
                        return;
                    }

                    let msg = match result {
                        Ok(chart) => StreamMessage::ChartUpdate {
                            sequence: delivered.fetch_add(1, Ordering::SeqCst) + 1,
                            chart,
                        },
                        Err(e) => {
                            tracing::warn!("Live refresh for {} failed: {}", esn, e);
                            StreamMessage::Error {
                                message: e.to_string(),
                            }
                        }
                    };
                    let _ = tx.send(msg).await;
                });
            }

            // 3. Bounded stream: wait for outstanding refreshes, then complete
            while pending.join_next().await.is_some() {}

            let complete = StreamMessage::Complete {
                updates: delivered.load(Ordering::SeqCst),
                duration_ms: start_time.elapsed().as_millis() as i64,
            };
            let _ = tx.send(complete).await;
        });

        rx
    }
}

enum Wake {
    Tick,
    Closed,
}

/// Wait for the next tick or for the client to go away, collecting finished
/// refreshes in the meantime so `pending` only holds in-flight fetches.
async fn next_wake<T>(tx: &mpsc::Sender<T>, ticker: &mut Interval, pending: &mut JoinSet<()>) -> Wake {
    loop {
        tokio::select! {
            _ = tx.closed() => return Wake::Closed,
            _ = ticker.tick() => return Wake::Tick,
            Some(_) = pending.join_next(), if !pending.is_empty() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::probe_repository::fake::FakeProbeRepository;
    use crate::domain::reading::RawReading;
    use crate::domain::zone::DisplayZone;
    use crate::infrastructure::config::ChartSettings;

    fn live(repo: FakeProbeRepository, max_refreshes: u64) -> LiveChartService {
        let charts = ChartService::new(Arc::new(repo), ChartSettings::default(), DisplayZone::utc());
        LiveChartService::new(
            charts,
            LiveSettings {
                refresh_interval_secs: 1,
                max_refreshes,
            },
        )
    }

    async fn drain(mut rx: mpsc::Receiver<StreamMessage>) -> Vec<StreamMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    }

    #[tokio::test]
    async fn test_skeleton_update_complete() {
        let mut repo = FakeProbeRepository::default();
        repo.history.insert(
            "0-1".to_string(),
            vec![RawReading::new("2024-03-01T10:05:00", 10).with_moisture(40.0)],
        );

        let rx = live(repo, 1).stream_chart("0-1", ChartRequest::default()).await;
        let messages = drain(rx).await;

        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[0], StreamMessage::Skeleton { esn, .. } if esn == "0-1"));
        match &messages[1] {
            StreamMessage::ChartUpdate { sequence, chart } => {
                assert_eq!(*sequence, 1);
                assert_eq!(chart.points.len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(matches!(messages[2], StreamMessage::Complete { updates: 1, .. }));
    }

    #[tokio::test]
    async fn test_failed_refresh_reports_error() {
        let repo = FakeProbeRepository {
            fail_history: true,
            ..Default::default()
        };

        let messages = drain(live(repo, 1).stream_chart("0-1", ChartRequest::default()).await).await;

        assert!(matches!(messages[1], StreamMessage::Error { .. }));
        assert!(matches!(messages[2], StreamMessage::Complete { updates: 0, .. }));
    }

    #[tokio::test]
    async fn test_dropping_receiver_stops_unbounded_stream() {
        let mut repo = FakeProbeRepository::default();
        repo.history.insert("0-1".to_string(), vec![]);
        let mut rx = live(repo, 0).stream_chart("0-1", ChartRequest::default()).await;

        assert!(matches!(rx.recv().await, Some(StreamMessage::Skeleton { .. })));
        assert!(matches!(rx.recv().await, Some(StreamMessage::ChartUpdate { .. })));
        drop(rx);
    }

    #[tokio::test]
    async fn test_finished_refreshes_are_collected_between_ticks() {
        let (tx, _rx) = mpsc::channel::<StreamMessage>(1);
        let mut ticker = tokio::time::interval(Duration::from_millis(50));
        ticker.tick().await;

        let mut pending = JoinSet::new();
        for _ in 0..100 {
            pending.spawn(async {});
        }

        assert!(matches!(next_wake(&tx, &mut ticker, &mut pending).await, Wake::Tick));
        assert_eq!(pending.len(), 0);
    }

    #[tokio::test]
    async fn test_wake_reports_closed_receiver() {
        let (tx, rx) = mpsc::channel::<StreamMessage>(1);
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        ticker.tick().await;
        drop(rx);

        let mut pending = JoinSet::new();
        assert!(matches!(next_wake(&tx, &mut ticker, &mut pending).await, Wake::Closed));
    }

    #[test]
    fn test_message_wire_format() {
        let msg = StreamMessage::Complete {
            updates: 2,
            duration_ms: 15,
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "complete");
        assert_eq!(json["updates"], 2);
    }
}
