//! Eyestream Detection Core
//!
//! Classifies eye events over sliding windows of recent observations:
//! - **History:** bounded FIFO windows for gaze positions and blink intensity
//! - **Fixation / Saccade:** anchored geometric displacement over the gaze window
//! - **Blink:** variance of mean eye-patch luminance over the intensity window
//! - **Engine:** owns both windows and turns one frame into one detection
//!
//! This crate is pure computation. No I/O, no transport, no scene access.
//! All inputs are data; all outputs are data.

pub mod blink;
pub mod displacement;
pub mod engine;
pub mod history;

pub use blink::{BlinkDetector, PatchRegion};
pub use displacement::{FixationDetector, SaccadeDetector, Verdict};
pub use engine::{Detection, EyeEventEngine};
pub use history::HistoryBuffer;
