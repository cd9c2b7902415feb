//! Eyestream Event Model
//!
//! Plain data shared by every stage of the pipeline:
//! - [`frame::Frame`]: one decoded camera frame plus its raw gaze reading
//! - [`gaze`]: raw and normalized gaze coordinates, and the normalizer
//! - [`channel`]: the four output channels and their stream declarations
//! - [`sample`]: per-channel output vectors, including the "no event" sentinel
//!
//! This crate performs no I/O.

pub mod channel;
pub mod frame;
pub mod gaze;
pub mod sample;

pub use channel::{ChannelFormat, OutputChannel, StreamInfo};
pub use frame::Frame;
pub use gaze::{normalize, GazeSample, RawGaze};
pub use sample::{EventSample, FrameSamples, Vec3, BLINK_FLAG, NO_EVENT};
