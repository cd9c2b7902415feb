//! Output channel declarations.

use serde::{Deserialize, Serialize};

/// The four fixed-rate output streams. Every processed frame yields exactly
/// one sample on each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputChannel {
    Fixation,
    Saccade,
    Blink,
    Gaze,
}

impl OutputChannel {
    /// All channels in publish order.
    pub const ALL: [OutputChannel; 4] = [
        OutputChannel::Fixation,
        OutputChannel::Saccade,
        OutputChannel::Blink,
        OutputChannel::Gaze,
    ];

    /// Stream name consumers resolve the channel by.
    pub fn stream_name(&self) -> &'static str {
        match self {
            Self::Fixation => "FixationDetection",
            Self::Saccade => "SaccadeDetection",
            Self::Blink => "BlinkDetection",
            Self::Gaze => "GazePosition",
        }
    }

    /// Number of values in one sample.
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Blink => 1,
            Self::Fixation | Self::Saccade | Self::Gaze => 3,
        }
    }

    /// Stable index into per-channel arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Fixation => 0,
            Self::Saccade => 1,
            Self::Blink => 2,
            Self::Gaze => 3,
        }
    }

    /// Stream declaration at the given nominal rate.
    pub fn stream_info(&self, nominal_rate_hz: f64) -> StreamInfo {
        StreamInfo {
            name: self.stream_name().to_string(),
            stream_type: self.stream_name().to_string(),
            channel_count: self.channel_count(),
            nominal_rate_hz,
            format: ChannelFormat::Float32,
        }
    }
}

impl std::fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stream_name())
    }
}

/// Element type of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFormat {
    Float32,
}

/// Declaration of one output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub channel_count: usize,
    pub nominal_rate_hz: f64,
    pub format: ChannelFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_match_stream_contract() {
        let counts: Vec<usize> = OutputChannel::ALL
            .iter()
            .map(|c| c.stream_info(30.0).channel_count)
            .collect();
        assert_eq!(counts, vec![3, 3, 1, 3]);

        let gaze = OutputChannel::Gaze.stream_info(30.0);
        assert_eq!(gaze.name, "GazePosition");
        assert_eq!(gaze.nominal_rate_hz, 30.0);
        assert_eq!(gaze.format, ChannelFormat::Float32);
    }

    #[test]
    fn indices_follow_publish_order() {
        for (i, channel) in OutputChannel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn stream_info_serializes_type_field() {
        let json = serde_json::to_string(&OutputChannel::Blink.stream_info(30.0)).unwrap();
        assert!(json.contains(r#""type":"BlinkDetection""#));
        assert!(json.contains(r#""format":"float32""#));
    }
}
