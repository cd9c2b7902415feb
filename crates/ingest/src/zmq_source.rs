//! ZeroMQ SUB frame source.

use std::time::Duration;

use eyestream_common::config::TransportConfig;
use eyestream_common::error::{EyestreamError, EyestreamResult};
use tracing::info;

use crate::{FrameSource, MultipartMessage, Received};

/// Subscribes to one topic on a remote publisher.
pub struct ZmqFrameSource {
    _context: zmq::Context,
    socket: zmq::Socket,
}

impl ZmqFrameSource {
    /// Connect a SUB socket to `config.address` and subscribe to `config.topic`.
    pub fn connect(config: &TransportConfig) -> EyestreamResult<Self> {
        Self::connect_with(&zmq::Context::new(), config)
    }

    /// Same as [`connect`](Self::connect) but on an existing context, which
    /// `inproc://` endpoints require.
    pub fn connect_with(context: &zmq::Context, config: &TransportConfig) -> EyestreamResult<Self> {
        let socket = context.socket(zmq::SUB).map_err(zmq_error)?;

        socket.set_linger(0).map_err(zmq_error)?;
        socket
            .set_rcvhwm(config.recv_hwm as i32)
            .map_err(zmq_error)?;
        socket.connect(&config.address).map_err(|e| {
            EyestreamError::source_failed(format!("connect {} failed: {e}", config.address))
        })?;
        socket
            .set_subscribe(config.topic.as_bytes())
            .map_err(zmq_error)?;

        info!(address = %config.address, topic = %config.topic, "Subscribed to frame publisher");

        Ok(Self {
            _context: context.clone(),
            socket,
        })
    }
}

impl FrameSource for ZmqFrameSource {
    fn recv(&mut self, timeout: Duration) -> EyestreamResult<Received> {
        let mut items = [self.socket.as_poll_item(zmq::POLLIN)];
        let ready = match zmq::poll(&mut items, timeout.as_millis() as i64) {
            Ok(n) => n,
            Err(zmq::Error::EINTR) => return Ok(Received::Idle),
            Err(zmq::Error::ETERM) => return Ok(Received::Closed),
            Err(e) => return Err(zmq_error(e)),
        };
        if ready == 0 || !items[0].is_readable() {
            return Ok(Received::Idle);
        }

        match self.socket.recv_multipart(0) {
            Ok(parts) => Ok(Received::Message(MultipartMessage::new(parts))),
            Err(zmq::Error::EINTR) => Ok(Received::Idle),
            Err(zmq::Error::ETERM) => Ok(Received::Closed),
            Err(e) => Err(zmq_error(e)),
        }
    }

    fn name(&self) -> &str {
        "zmq-sub"
    }
}

fn zmq_error(e: zmq::Error) -> EyestreamError {
    EyestreamError::source_failed(format!("zmq: {e}"))
}
