// Persistence seam for dashboard settings
use crate::domain::thresholds::MoistureRange;

pub trait SettingsStore: Send + Sync {
    /// Stored bounds for a probe, or the store's default when it has one
    fn load_thresholds(&self, esn: &str) -> anyhow::Result<Option<MoistureRange>>;

    fn save_thresholds(&self, esn: &str, range: MoistureRange) -> anyhow::Result<()>;
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemorySettingsStore {
        thresholds: Mutex<HashMap<String, MoistureRange>>,
    }

    impl SettingsStore for InMemorySettingsStore {
        fn load_thresholds(&self, esn: &str) -> anyhow::Result<Option<MoistureRange>> {
            Ok(self.thresholds.lock().unwrap().get(esn).copied())
        }

        fn save_thresholds(&self, esn: &str, range: MoistureRange) -> anyhow::Result<()> {
            self.thresholds.lock().unwrap().insert(esn.to_string(), range);
            Ok(())
        }
    }
}
