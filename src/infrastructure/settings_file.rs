// TOML-backed settings store for per-probe moisture thresholds
use crate::application::settings_store::SettingsStore;
use crate::domain::thresholds::MoistureRange;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// On-disk layout:
///
/// ```toml
/// [default]
/// min = 45
/// max = 55
///
/// [thresholds."0-1234567"]
/// min = 30
/// max = 60
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<MoistureRange>,
    #[serde(default)]
    thresholds: BTreeMap<String, MoistureRange>,
}

pub struct TomlSettingsStore {
    path: PathBuf,
    state: Mutex<SettingsFile>,
}

impl TomlSettingsStore {
    /// Open the file, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("Failed to parse settings file {}", path.display()))?
        } else {
            tracing::info!("Settings file {} not found, starting with defaults", path.display());
            SettingsFile::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &SettingsFile) -> Result<()> {
        let raw = toml::to_string_pretty(state).context("Failed to encode settings")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic replace
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load_thresholds(&self, esn: &str) -> Result<Option<MoistureRange>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.thresholds.get(esn).copied().or(state.default))
    }

    fn save_thresholds(&self, esn: &str, range: MoistureRange) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut thresholds = state.thresholds.clone();
        thresholds.insert(esn.to_string(), range);
        let next = SettingsFile {
            default: state.default,
            thresholds,
        };

        // Memory only follows a successful write
        self.persist(&next)?;
        *state = next;

        tracing::info!("Saved thresholds {}-{} for probe {}", range.min, range.max, esn);
        Ok(())
    }
}
