//! Decoded camera frames.

use image::RgbImage;

use crate::gaze::RawGaze;

/// One decoded frame and the gaze reading that arrived with it.
///
/// Frames are transient: the loop iteration that decoded a frame owns it
/// and drops it once the frame has been processed.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the source message in arrival order. Messages that fail
    /// to decode still consume a sequence number.
    pub sequence: u64,

    /// Pixel buffer, always `width x height` of the configured geometry.
    pub image: RgbImage,

    pub gaze_raw: RawGaze,
}

impl Frame {
    pub fn new(sequence: u64, image: RgbImage, gaze_raw: RawGaze) -> Self {
        Self {
            sequence,
            image,
            gaze_raw,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
