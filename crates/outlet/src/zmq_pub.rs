//! ZeroMQ PUB outlet.
//!
//! All four streams share one bound PUB socket. Each sample goes out as a
//! two-part message: the stream name as topic, then a little-endian `f64`
//! timestamp followed by the little-endian `f32` values.

use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};
use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::StreamInfo;
use parking_lot::Mutex;
use tracing::info;

use crate::{check_width, Outlet};

/// A bound PUB socket shared by several outlets.
#[derive(Clone)]
pub struct ZmqPublisherSocket {
    socket: Arc<Mutex<zmq::Socket>>,
    _context: zmq::Context,
}

impl ZmqPublisherSocket {
    pub fn bind(address: &str) -> EyestreamResult<Self> {
        Self::bind_with(&zmq::Context::new(), address)
    }

    /// Bind on an existing context so `inproc://` subscribers can reach it.
    pub fn bind_with(context: &zmq::Context, address: &str) -> EyestreamResult<Self> {
        let socket = context.socket(zmq::PUB).map_err(zmq_error)?;
        socket.set_linger(0).map_err(zmq_error)?;
        socket
            .bind(address)
            .map_err(|e| EyestreamError::outlet(format!("bind {address} failed: {e}")))?;

        info!(address, "Publishing output streams");

        Ok(Self {
            socket: Arc::new(Mutex::new(socket)),
            _context: context.clone(),
        })
    }
}

pub struct ZmqPubOutlet {
    info: StreamInfo,
    socket: ZmqPublisherSocket,
    pushed: u64,
}

impl ZmqPubOutlet {
    pub fn new(socket: ZmqPublisherSocket, info: StreamInfo) -> Self {
        Self {
            info,
            socket,
            pushed: 0,
        }
    }
}

impl Outlet for ZmqPubOutlet {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn push_sample(&mut self, values: &[f32], timestamp: f64) -> EyestreamResult<()> {
        check_width(&self.info, values)?;

        let mut payload = Vec::with_capacity(8 + 4 * values.len());
        payload.write_f64::<LittleEndian>(timestamp)?;
        for value in values {
            payload.write_f32::<LittleEndian>(*value)?;
        }

        let parts: [&[u8]; 2] = [self.info.name.as_bytes(), &payload];
        self.socket
            .socket
            .lock()
            .send_multipart(parts, 0)
            .map_err(zmq_error)?;
        self.pushed += 1;
        Ok(())
    }

    fn flush(&mut self) -> EyestreamResult<()> {
        Ok(())
    }

    fn samples_pushed(&self) -> u64 {
        self.pushed
    }
}

fn zmq_error(e: zmq::Error) -> EyestreamError {
    EyestreamError::outlet(format!("zmq: {e}"))
}
