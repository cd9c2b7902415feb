//! Diagnostic overlay.
//!
//! Draws a box around the gaze point on a copy of the frame and hands the
//! copy to a [`FrameDisplay`]. Display failures are logged and counted;
//! after [`MAX_CONSECUTIVE_FAILURES`] in a row the overlay switches itself
//! off. Nothing here can fail the session.

use std::path::{Path, PathBuf};

use eyestream_common::config::{DisplayKind, OverlayConfig};
use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::GazeSample;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, warn};

pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// A surface that shows annotated frames.
pub trait FrameDisplay {
    fn show(&mut self, image: &RgbImage) -> EyestreamResult<()>;

    /// Non-blocking check for a user request to stop the session.
    fn close_requested(&mut self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Discards frames.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl FrameDisplay for NullDisplay {
    fn show(&mut self, _image: &RgbImage) -> EyestreamResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Overwrites one PNG file with the latest annotated frame.
#[derive(Debug)]
pub struct SnapshotDisplay {
    path: PathBuf,
}

impl SnapshotDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameDisplay for SnapshotDisplay {
    fn show(&mut self, image: &RgbImage) -> EyestreamResult<()> {
        image.save(&self.path).map_err(|e| {
            EyestreamError::display(format!("write {}: {e}", self.path.display()))
        })
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}

/// Live window. Escape or closing the window requests shutdown.
#[cfg(feature = "window")]
pub struct WindowDisplay {
    window: minifb::Window,
    buffer: Vec<u32>,
}

#[cfg(feature = "window")]
impl WindowDisplay {
    pub fn open(title: &str, width: u32, height: u32) -> EyestreamResult<Self> {
        let window = minifb::Window::new(
            title,
            width as usize,
            height as usize,
            minifb::WindowOptions::default(),
        )
        .map_err(|e| EyestreamError::display(format!("failed to create window: {e}")))?;

        Ok(Self {
            window,
            buffer: vec![0; width as usize * height as usize],
        })
    }
}

#[cfg(feature = "window")]
impl FrameDisplay for WindowDisplay {
    fn show(&mut self, image: &RgbImage) -> EyestreamResult<()> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        self.buffer.resize(width * height, 0);
        for (slot, pixel) in self.buffer.iter_mut().zip(image.pixels()) {
            let [r, g, b] = pixel.0;
            *slot = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
        }

        self.window
            .update_with_buffer(&self.buffer, width, height)
            .map_err(|e| EyestreamError::display(format!("window update failed: {e}")))
    }

    fn close_requested(&mut self) -> bool {
        !self.window.is_open() || self.window.is_key_down(minifb::Key::Escape)
    }

    fn name(&self) -> &str {
        "window"
    }
}

pub struct DiagnosticOverlay {
    display: Box<dyn FrameDisplay>,
    box_half_size: u32,
    thickness: u32,
    consecutive_failures: u32,
    disabled: bool,
    frames_shown: u64,
}

impl DiagnosticOverlay {
    pub fn new(display: Box<dyn FrameDisplay>, box_half_size: u32, thickness: u32) -> Self {
        Self {
            display,
            box_half_size,
            thickness,
            consecutive_failures: 0,
            disabled: false,
            frames_shown: 0,
        }
    }

    /// Build the overlay the config asks for, or `None` when it is off.
    pub fn from_config(
        config: &OverlayConfig,
        frame_width: u32,
        frame_height: u32,
    ) -> EyestreamResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let display: Box<dyn FrameDisplay> = match config.display {
            DisplayKind::None => Box::new(NullDisplay),
            DisplayKind::Snapshot => Box::new(SnapshotDisplay::new(&config.snapshot_path)),
            DisplayKind::Window => open_window(frame_width, frame_height)?,
        };
        Ok(Some(Self::new(
            display,
            config.box_half_size,
            config.thickness,
        )))
    }

    /// Copy of `image` with the gaze box drawn on it.
    pub fn annotate(&self, image: &RgbImage, gaze: GazeSample) -> RgbImage {
        let mut annotated = image.clone();
        let side = (self.box_half_size * 2).max(1);
        let left = gaze.x.round() as i32 - self.box_half_size as i32;
        let top = gaze.y.round() as i32 - self.box_half_size as i32;

        // Thickness grows outwards from the nominal box.
        for ring in 0..self.thickness.max(1) {
            let rect = Rect::at(left - ring as i32, top - ring as i32)
                .of_size(side + 2 * ring, side + 2 * ring);
            draw_hollow_rect_mut(&mut annotated, rect, BOX_COLOR);
        }
        annotated
    }

    /// Draw and show one frame. Returns true when the display asks the
    /// session to stop.
    pub fn present(&mut self, image: &RgbImage, gaze: GazeSample) -> bool {
        if self.disabled {
            return false;
        }

        let annotated = self.annotate(image, gaze);
        match self.display.show(&annotated) {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.frames_shown += 1;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    display = self.display.name(),
                    failures = self.consecutive_failures,
                    error = %e,
                    "Overlay display failed"
                );
                if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    warn!(display = self.display.name(), "Disabling diagnostic overlay");
                    self.disabled = true;
                }
                return false;
            }
        }

        let close = self.display.close_requested();
        if close {
            debug!(display = self.display.name(), "Display requested shutdown");
        }
        close
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

#[cfg(feature = "window")]
fn open_window(width: u32, height: u32) -> EyestreamResult<Box<dyn FrameDisplay>> {
    Ok(Box::new(WindowDisplay::open("eyestream", width, height)?))
}

#[cfg(not(feature = "window"))]
fn open_window(_width: u32, _height: u32) -> EyestreamResult<Box<dyn FrameDisplay>> {
    Err(EyestreamError::unsupported(
        "window display requires the `window` feature",
    ))
}
