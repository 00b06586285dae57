// Application state for HTTP handlers
use crate::application::account_service::AccountService;
use crate::application::chart_service::ChartService;
use crate::application::probe_service::ProbeService;
use crate::application::streaming_service::LiveChartService;
use crate::application::threshold_service::ThresholdService;
use crate::domain::zone::DisplayZone;

#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub probe_service: ProbeService,
    pub chart_service: ChartService,
    pub live_service: LiveChartService,
    pub threshold_service: ThresholdService,
    /// Zone query timestamps are interpreted in
    pub zone: DisplayZone,
}
