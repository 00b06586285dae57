// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use soil_dashboard::application::account_service::AccountService;
use soil_dashboard::application::chart_service::ChartService;
use soil_dashboard::application::probe_repository::ProbeRepository;
use soil_dashboard::application::probe_service::ProbeService;
use soil_dashboard::application::streaming_service::LiveChartService;
use soil_dashboard::application::threshold_service::ThresholdService;
use soil_dashboard::domain::zone::DisplayZone;
use soil_dashboard::infrastructure::backend_client::HttpProbeBackend;
use soil_dashboard::infrastructure::config::{load_backend_config, load_dashboard_config};
use soil_dashboard::infrastructure::settings_file::TomlSettingsStore;
use soil_dashboard::presentation::app_state::AppState;
use soil_dashboard::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let backend_config = load_backend_config()?;
    let dashboard_config = load_dashboard_config()?;
    let zone = DisplayZone::from_offset_minutes(dashboard_config.chart.utc_offset_minutes)?;

    // Create adapters (infrastructure layer)
    let repository: Arc<dyn ProbeRepository> = Arc::new(HttpProbeBackend::new(&backend_config.backend)?);
    let settings_store = Arc::new(TomlSettingsStore::open(&dashboard_config.settings.path)?);

    // Create services (application layer)
    let threshold_service = ThresholdService::new(repository.clone(), settings_store);
    let chart_service = ChartService::new(repository.clone(), dashboard_config.chart.clone(), zone);
    let live_service = LiveChartService::new(chart_service.clone(), dashboard_config.live.clone());
    let probe_service = ProbeService::new(repository.clone(), threshold_service.clone(), zone);
    let account_service = AccountService::new(repository);

    // Create application state
    let state = Arc::new(AppState {
        account_service,
        probe_service,
        chart_service,
        live_service,
        threshold_service,
        zone,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = dashboard_config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", dashboard_config.server.listen_addr))?;
    tracing::info!(
        "Starting soil-dashboard on {} (backend {})",
        addr,
        backend_config.backend.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
