// Domain layer - Probe data shapes and pure chart computations
pub mod bucketing;
pub mod chart;
pub mod farm;
pub mod probe;
pub mod rain;
pub mod range_selector;
pub mod reading;
pub mod resolution;
pub mod smoothing;
pub mod thresholds;
pub mod user;
pub mod viewport;
pub mod zone;
