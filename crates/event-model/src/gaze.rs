//! Gaze coordinates.
//!
//! Raw gaze arrives as two signed 16-bit integers with the vertical axis
//! pointing up. Internally the vertical axis is flipped so that it matches
//! image row indexing (origin at the top-left of the frame).

use serde::{Deserialize, Serialize};

/// Gaze position exactly as it came off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawGaze {
    pub x: i16,
    pub y: i16,
}

impl RawGaze {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Shorthand for [`normalize`].
    pub fn normalize(&self, image_height: u32) -> GazeSample {
        normalize(self.x, self.y, image_height)
    }
}

/// Gaze position in the engine's internal coordinate space.
///
/// Always finite. A `GazeSample` never carries a sentinel meaning; sentinels
/// only exist on published output vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub x: f64,
    pub y: f64,
}

impl GazeSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to another sample.
    pub fn distance_sq(&self, other: &GazeSample) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Map a raw gaze reading into internal coordinates: `y' = image_height - raw_y`.
pub fn normalize(raw_x: i16, raw_y: i16, image_height: u32) -> GazeSample {
    GazeSample {
        x: raw_x as f64,
        y: image_height as f64 - raw_y as f64,
    }
}
