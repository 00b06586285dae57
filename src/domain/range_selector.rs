// Dual-thumb range selector - Drag state machine for the moisture zone editor
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum separation between the two thumbs, in percentage points
pub const THUMB_MARGIN: u8 = 5;
pub const DEFAULT_LOW: u8 = 45;
pub const DEFAULT_HIGH: u8 = 55;
const TRACK_MAX: u8 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range bounds must lie within 0..=100, got {low}..{high}")]
    OutOfBounds { low: u8, high: u8 },
    #[error("range bounds {low}..{high} must be at least {margin} apart")]
    TooClose { low: u8, high: u8, margin: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Thumb {
    Low,
    High,
}

/// Screen-space box of the slider track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRect {
    pub left: f64,
    pub width: f64,
}

impl TrackRect {
    /// Pointer x as a whole percentage of the track, clamped to 0..=100.
    /// A collapsed track yields nothing.
    pub fn percent_at(&self, client_x: f64) -> Option<u8> {
        if self.width <= 0.0 || !client_x.is_finite() {
            return None;
        }
        let percent = ((client_x - self.left) / self.width * 100.0).clamp(0.0, 100.0);
        Some(percent.round() as u8)
    }
}

/// Raw input events from either a mouse or a touch screen
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    MouseDown(Thumb),
    MouseMove { client_x: f64 },
    MouseUp,
    TouchStart(Thumb),
    /// Active touch points; the first one drives the drag
    TouchMove { touches: Vec<f64> },
    TouchEnd,
    TouchCancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Press(Thumb),
    Move(f64),
    Release,
}

impl PointerInput {
    fn gesture(&self) -> Option<Gesture> {
        match self {
            PointerInput::MouseDown(thumb) | PointerInput::TouchStart(thumb) => Some(Gesture::Press(*thumb)),
            PointerInput::MouseMove { client_x } => Some(Gesture::Move(*client_x)),
            PointerInput::TouchMove { touches } => touches.first().copied().map(Gesture::Move),
            PointerInput::MouseUp | PointerInput::TouchEnd | PointerInput::TouchCancel => Some(Gesture::Release),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualThumbRange {
    low: u8,
    high: u8,
    dragging: Option<Thumb>,
}

impl Default for DualThumbRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            dragging: None,
        }
    }
}

impl DualThumbRange {
    /// Build a range from explicit bounds, enforcing the separation margin
    pub fn from_bounds(low: u8, high: u8) -> Result<Self, RangeError> {
        if low > TRACK_MAX || high > TRACK_MAX {
            return Err(RangeError::OutOfBounds { low, high });
        }
        if u16::from(low) + u16::from(THUMB_MARGIN) > u16::from(high) {
            return Err(RangeError::TooClose {
                low,
                high,
                margin: THUMB_MARGIN,
            });
        }
        Ok(Self {
            low,
            high,
            dragging: None,
        })
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn dragging(&self) -> Option<Thumb> {
        self.dragging
    }

    /// Back to the default bounds, dropping any drag in progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one input event. Returns true when a thumb value changed.
    pub fn handle(&mut self, input: &PointerInput, track: TrackRect) -> bool {
        match input.gesture() {
            Some(Gesture::Press(thumb)) => {
                self.dragging = Some(thumb);
                false
            }
            Some(Gesture::Release) => {
                self.dragging = None;
                false
            }
            Some(Gesture::Move(client_x)) => match (self.dragging, track.percent_at(client_x)) {
                (Some(thumb), Some(value)) => self.move_thumb(thumb, value),
                _ => false,
            },
            None => false,
        }
    }

    /// Move one thumb, rejecting values that would cross the margin
    pub fn move_thumb(&mut self, thumb: Thumb, value: u8) -> bool {
        let value = value.min(TRACK_MAX);
        match thumb {
            Thumb::Low if value <= self.high.saturating_sub(THUMB_MARGIN) && value != self.low => {
                self.low = value;
                true
            }
            Thumb::High if u16::from(value) >= u16::from(self.low) + u16::from(THUMB_MARGIN) && value != self.high => {
                self.high = value;
                true
            }
            _ => false,
        }
    }
}
