// Route table for the dashboard gateway
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_farm, create_probe, get_thresholds, health_check, list_farms, list_probes, live_chart, login,
    probe_chart, put_thresholds, register,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Compression is handled in the response builders, so no CompressionLayer here
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/probes", get(list_probes).post(create_probe))
        .route("/farms", get(list_farms).post(create_farm))
        .route("/probes/:esn/chart", get(probe_chart))
        .route("/probes/:esn/live", get(live_chart))
        .route("/probes/:esn/thresholds", get(get_thresholds).put(put_thresholds))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
