// Moisture thresholds - Zone bounds for dry / ideal / saturated soil
use super::range_selector::{DualThumbRange, RangeError, DEFAULT_HIGH, DEFAULT_LOW};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoistureRange {
    pub min: u8,
    pub max: u8,
}

impl Default for MoistureRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_LOW,
            max: DEFAULT_HIGH,
        }
    }
}

impl MoistureRange {
    /// Validated the same way the zone editor constrains its thumbs
    pub fn new(min: u8, max: u8) -> Result<Self, RangeError> {
        let range = DualThumbRange::from_bounds(min, max)?;
        Ok(Self::from(&range))
    }

    pub fn classify(&self, moisture_pct: f64) -> MoistureZone {
        if moisture_pct < f64::from(self.min) {
            MoistureZone::Dry
        } else if moisture_pct > f64::from(self.max) {
            MoistureZone::Saturated
        } else {
            MoistureZone::Ideal
        }
    }
}

impl From<&DualThumbRange> for MoistureRange {
    fn from(range: &DualThumbRange) -> Self {
        Self {
            min: range.low(),
            max: range.high(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureZone {
    Dry,
    Ideal,
    Saturated,
}
