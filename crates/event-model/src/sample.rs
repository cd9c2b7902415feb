//! Per-channel output samples.
//!
//! A value of `-1` in every slot means "no detection this frame". Sentinel
//! samples are published, never omitted, so every channel keeps one sample
//! per processed frame.

use serde::{Deserialize, Serialize};

use crate::channel::OutputChannel;
use crate::gaze::GazeSample;

/// Sentinel slot value.
pub const NO_EVENT: f32 = -1.0;

/// Flag value published on the blink channel when a blink fires.
pub const BLINK_FLAG: f32 = 1.0;

/// A 3D position, as used by the scene marker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lift a gaze sample onto the `z = 0` plane.
    pub fn from_gaze(gaze: GazeSample) -> Self {
        Self::new(gaze.x, gaze.y, 0.0)
    }
}

/// One sample on one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventSample {
    Vector([f32; 3]),
    Scalar([f32; 1]),
}

impl EventSample {
    pub const NO_VECTOR: EventSample = EventSample::Vector([NO_EVENT; 3]);
    pub const NO_SCALAR: EventSample = EventSample::Scalar([NO_EVENT; 1]);

    /// Sentinel shaped for the given channel.
    pub fn sentinel(channel: OutputChannel) -> Self {
        match channel.channel_count() {
            1 => Self::NO_SCALAR,
            _ => Self::NO_VECTOR,
        }
    }

    pub fn position(position: Vec3) -> Self {
        Self::Vector([position.x as f32, position.y as f32, position.z as f32])
    }

    pub fn gaze(gaze: GazeSample) -> Self {
        Self::Vector([gaze.x as f32, gaze.y as f32, 0.0])
    }

    pub fn flag(value: f32) -> Self {
        Self::Scalar([value])
    }

    pub fn values(&self) -> &[f32] {
        match self {
            Self::Vector(v) => v,
            Self::Scalar(v) => v,
        }
    }

    /// Whether every slot holds the sentinel value.
    pub fn is_sentinel(&self) -> bool {
        self.values().iter().all(|v| *v == NO_EVENT)
    }
}

/// The four samples produced for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSamples {
    pub fixation: EventSample,
    pub saccade: EventSample,
    pub blink: EventSample,
    pub gaze: EventSample,
}

impl FrameSamples {
    /// No events, only the gaze position.
    pub fn quiet(gaze: GazeSample) -> Self {
        Self {
            fixation: EventSample::NO_VECTOR,
            saccade: EventSample::NO_VECTOR,
            blink: EventSample::NO_SCALAR,
            gaze: EventSample::gaze(gaze),
        }
    }

    pub fn get(&self, channel: OutputChannel) -> &EventSample {
        match channel {
            OutputChannel::Fixation => &self.fixation,
            OutputChannel::Saccade => &self.saccade,
            OutputChannel::Blink => &self.blink,
            OutputChannel::Gaze => &self.gaze,
        }
    }

    /// Samples paired with their channel, in publish order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputChannel, &EventSample)> + '_ {
        OutputChannel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_shapes_follow_channel_counts() {
        for channel in OutputChannel::ALL {
            let sentinel = EventSample::sentinel(channel);
            assert_eq!(sentinel.values().len(), channel.channel_count());
            assert!(sentinel.is_sentinel());
        }
    }

    #[test]
    fn quiet_frame_keeps_gaze() {
        let samples = FrameSamples::quiet(GazeSample::new(100.0, 300.0));
        assert!(samples.fixation.is_sentinel());
        assert!(samples.saccade.is_sentinel());
        assert!(samples.blink.is_sentinel());
        assert_eq!(samples.gaze.values(), &[100.0, 300.0, 0.0]);
        assert!(!samples.gaze.is_sentinel());
    }

    #[test]
    fn iter_visits_channels_in_publish_order() {
        let samples = FrameSamples::quiet(GazeSample::new(1.0, 2.0));
        let order: Vec<OutputChannel> = samples.iter().map(|(c, _)| c).collect();
        assert_eq!(order, OutputChannel::ALL.to_vec());
    }

    #[test]
    fn position_sample_carries_marker_z() {
        let sample = EventSample::position(Vec3::new(1.0, 2.0, 3.5));
        assert_eq!(sample.values(), &[1.0, 2.0, 3.5]);
    }
}
