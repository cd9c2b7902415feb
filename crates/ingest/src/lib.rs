//! Eyestream Frame Ingestion
//!
//! Turns raw multi-part messages into decoded [`Frame`]s. A message carries
//! four parts: topic, metadata, encoded image bytes, gaze bytes. Sources are
//! pluggable:
//!
//! - **Scripted:** an in-memory queue, used by tests and the simulator
//! - **ZMQ:** a SUB socket subscribed to one topic (feature `zmq`)
//!
//! Malformed messages surface as [`Ingested::Skipped`] and never produce a
//! partial frame.

pub mod decode;
pub mod gaze;
pub mod scripted;
#[cfg(feature = "zmq")]
pub mod zmq_source;

use std::time::Duration;

use eyestream_common::error::{EyestreamResult, FrameError};
use eyestream_event_model::Frame;

pub use decode::FrameDecoder;
pub use gaze::GazeCodec;
pub use scripted::ScriptedSource;
#[cfg(feature = "zmq")]
pub use zmq_source::ZmqFrameSource;

/// One multi-part message as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartMessage {
    pub parts: Vec<Vec<u8>>,
}

impl MultipartMessage {
    pub fn new(parts: Vec<Vec<u8>>) -> Self {
        Self { parts }
    }

    /// Assemble the standard four-part frame message.
    pub fn frame(topic: &str, metadata: Vec<u8>, image: Vec<u8>, gaze: Vec<u8>) -> Self {
        Self::new(vec![topic.as_bytes().to_vec(), metadata, image, gaze])
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Result of a single receive attempt.
#[derive(Debug)]
pub enum Received {
    Message(MultipartMessage),
    /// Nothing arrived within the timeout.
    Idle,
    /// The source has no more messages and never will.
    Closed,
}

/// Trait for frame transports.
pub trait FrameSource: Send {
    /// Wait up to `timeout` for the next message.
    ///
    /// Errors returned here are fatal for the source; malformed messages are
    /// returned as `Received::Message` and rejected later by the decoder.
    fn recv(&mut self, timeout: Duration) -> EyestreamResult<Received>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Outcome of one ingest step.
#[derive(Debug)]
pub enum Ingested {
    Frame(Frame),
    /// The message with this sequence number was rejected.
    Skipped { sequence: u64, error: FrameError },
    Idle,
    Closed,
}

/// Couples a source with a decoder and numbers incoming messages.
pub struct FrameIngestor {
    source: Box<dyn FrameSource>,
    decoder: FrameDecoder,
    next_sequence: u64,
}

impl FrameIngestor {
    pub fn new(source: Box<dyn FrameSource>, decoder: FrameDecoder) -> Self {
        Self {
            source,
            decoder,
            next_sequence: 0,
        }
    }

    /// Receive and decode the next message.
    pub fn next_frame(&mut self, timeout: Duration) -> EyestreamResult<Ingested> {
        let message = match self.source.recv(timeout)? {
            Received::Message(message) => message,
            Received::Idle => return Ok(Ingested::Idle),
            Received::Closed => return Ok(Ingested::Closed),
        };

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        match self.decoder.decode(sequence, &message) {
            Ok(frame) => Ok(Ingested::Frame(frame)),
            Err(error) => Ok(Ingested::Skipped { sequence, error }),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Messages received so far, decoded or not.
    pub fn messages_received(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyestream_common::config::{GazePayloadLayout, ImageConfig};

    fn decoder() -> FrameDecoder {
        FrameDecoder::new(
            &ImageConfig {
                width: 8,
                height: 8,
                ..Default::default()
            },
            GazePayloadLayout::Wide,
        )
    }

    #[test]
    fn ingestor_numbers_messages_including_rejects() {
        let good = decode::tests::encoded_frame_message(8, 8, 3, 4);
        let bad = MultipartMessage::new(vec![b"CamCapture".to_vec()]);
        let source = ScriptedSource::new(vec![good.clone(), bad, good]);
        let mut ingestor = FrameIngestor::new(Box::new(source), decoder());

        let timeout = Duration::from_millis(1);
        assert!(matches!(
            ingestor.next_frame(timeout).unwrap(),
            Ingested::Frame(Frame { sequence: 0, .. })
        ));
        match ingestor.next_frame(timeout).unwrap() {
            Ingested::Skipped { sequence, error } => {
                assert_eq!(sequence, 1);
                assert_eq!(error.kind(), "transport");
            }
            other => panic!("expected skip, got {other:?}"),
        }
        assert!(matches!(
            ingestor.next_frame(timeout).unwrap(),
            Ingested::Frame(Frame { sequence: 2, .. })
        ));
        assert!(matches!(ingestor.next_frame(timeout).unwrap(), Ingested::Closed));
        assert_eq!(ingestor.messages_received(), 3);
    }
}
