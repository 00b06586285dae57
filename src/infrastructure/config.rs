use serde::Deserialize;

const ENV_PREFIX: &str = "SOIL_DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub backend: BackendSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub chart: ChartSettings,
    pub live: LiveSettings,
    pub settings: SettingsFileConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub smoothing_radius: usize,
    pub history_limit: usize,
    pub initial_window_days: i64,
    /// Fixed display offset; server local time when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            smoothing_radius: 1,
            history_limit: 2000,
            initial_window_days: 3,
            utc_offset_minutes: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LiveSettings {
    pub refresh_interval_secs: u64,
    /// 0 streams until the client disconnects
    pub max_refreshes: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            max_refreshes: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SettingsFileConfig {
    pub path: String,
}

impl Default for SettingsFileConfig {
    fn default() -> Self {
        Self {
            path: "config/thresholds.toml".to_string(),
        }
    }
}

pub fn load_backend_config() -> anyhow::Result<BackendConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/backend"))
        .add_source(env_source())
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(env_source())
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// e.g. `SOIL_DASHBOARD__BACKEND__BASE_URL`
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
