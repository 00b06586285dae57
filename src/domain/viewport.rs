// Chart viewport - Index window over the chart points
use super::chart::ChartPoint;
use chrono::Duration;
use serde::{Deserialize, Serialize};

const ZOOM_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zoom {
    In,
    Out,
    Reset,
}

/// Inclusive index range of the visible points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartWindow {
    pub start_index: usize,
    pub end_index: usize,
}

impl ChartWindow {
    pub fn full(len: usize) -> Self {
        Self {
            start_index: 0,
            end_index: len.saturating_sub(1),
        }
    }

    /// Window covering the last `days` of data, measured back from the
    /// newest point.
    pub fn initial(points: &[ChartPoint], days: i64) -> Self {
        let Some(last) = points.last() else {
            return Self::full(0);
        };

        let cutoff = last.time - Duration::days(days);
        let start_index = points.iter().position(|p| p.time >= cutoff).unwrap_or(0);

        Self {
            start_index,
            end_index: points.len() - 1,
        }
    }

    /// Clamp a client-supplied window to a series of `len` points
    pub fn clamped(start_index: usize, end_index: usize, len: usize) -> Self {
        let last = len.saturating_sub(1);
        let end_index = end_index.min(last);
        Self {
            start_index: start_index.min(end_index),
            end_index,
        }
    }

    pub fn apply(self, zoom: Zoom, len: usize) -> Self {
        match zoom {
            Zoom::In => self.zoom_in(len),
            Zoom::Out => self.zoom_out(len),
            Zoom::Reset => Self::full(len),
        }
    }

    fn step(&self) -> usize {
        let size = self.end_index.saturating_sub(self.start_index);
        ((size as f64 * ZOOM_FACTOR).floor() as usize).max(1)
    }

    /// Never narrows below two points; windows already that small stay put
    fn zoom_in(self, len: usize) -> Self {
        if len < 2 || self.end_index.saturating_sub(self.start_index) < 2 {
            return self;
        }
        let step = self.step();
        let start_index = (self.start_index + step).min(self.end_index - 1);
        Self {
            start_index,
            end_index: self.end_index.saturating_sub(step).max(start_index + 1).min(len - 1),
        }
    }

    fn zoom_out(self, len: usize) -> Self {
        if len < 2 {
            return self;
        }
        let step = self.step();
        Self {
            start_index: self.start_index.saturating_sub(step),
            end_index: (self.end_index + step).min(len - 1),
        }
    }
}
