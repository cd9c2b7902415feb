//! In-memory frame source.

use std::collections::VecDeque;
use std::time::Duration;

use eyestream_common::error::EyestreamResult;

use crate::{FrameSource, MultipartMessage, Received};

/// Replays a fixed list of messages, then reports `Closed`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<MultipartMessage>,
}

impl ScriptedSource {
    pub fn new(messages: impl IntoIterator<Item = MultipartMessage>) -> Self {
        Self {
            queue: messages.into_iter().collect(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn recv(&mut self, _timeout: Duration) -> EyestreamResult<Received> {
        Ok(match self.queue.pop_front() {
            Some(message) => Received::Message(message),
            None => Received::Closed,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_messages_in_order_then_closes() {
        let mut source = ScriptedSource::new([
            MultipartMessage::new(vec![b"first".to_vec()]),
            MultipartMessage::new(vec![b"second".to_vec()]),
        ]);
        let timeout = Duration::from_millis(1);

        for expected in [b"first".as_slice(), b"second".as_slice()] {
            match source.recv(timeout).unwrap() {
                Received::Message(message) => assert_eq!(message.parts[0], expected),
                other => panic!("expected a message, got {other:?}"),
            }
        }
        assert!(matches!(source.recv(timeout).unwrap(), Received::Closed));
        assert!(matches!(source.recv(timeout).unwrap(), Received::Closed));
    }
}
