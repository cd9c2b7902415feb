//! Eyestream Outlets
//!
//! Every output channel is an [`Outlet`]: a declared stream that accepts
//! fixed-width `f32` samples with a timestamp. The [`Publisher`] owns one
//! outlet per [`OutputChannel`] and pushes a frame's four samples in
//! channel order.
//!
//! Backends:
//! - [`JsonlOutlet`]: one append-only JSONL file per stream
//! - [`MemoryOutlet`]: records into a shared in-process buffer
//! - [`NullOutlet`]: counts and discards
//! - `ZmqPubOutlet`: PUB socket, one topic per stream (feature `zmq`)

pub mod jsonl;
pub mod memory;
pub mod publisher;
#[cfg(feature = "zmq")]
pub mod zmq_pub;

use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::StreamInfo;

pub use eyestream_event_model::OutputChannel;
pub use jsonl::JsonlOutlet;
pub use memory::{MemoryHandle, MemoryOutlet, RecordedSample};
pub use publisher::Publisher;
#[cfg(feature = "zmq")]
pub use zmq_pub::{ZmqPubOutlet, ZmqPublisherSocket};

/// A declared output stream.
pub trait Outlet: Send {
    /// Declaration this outlet was created with.
    fn info(&self) -> &StreamInfo;

    /// Push one sample. `values.len()` must equal the declared channel count.
    fn push_sample(&mut self, values: &[f32], timestamp: f64) -> EyestreamResult<()>;

    /// Flush buffered samples to the backend.
    fn flush(&mut self) -> EyestreamResult<()>;

    /// Samples accepted so far.
    fn samples_pushed(&self) -> u64;
}

/// Reject samples whose width differs from the declaration.
pub(crate) fn check_width(info: &StreamInfo, values: &[f32]) -> EyestreamResult<()> {
    if values.len() != info.channel_count {
        return Err(EyestreamError::outlet(format!(
            "{}: sample has {} values, stream declares {}",
            info.name,
            values.len(),
            info.channel_count
        )));
    }
    Ok(())
}

/// Accepts and discards samples.
#[derive(Debug)]
pub struct NullOutlet {
    info: StreamInfo,
    pushed: u64,
}

impl NullOutlet {
    pub fn new(info: StreamInfo) -> Self {
        Self { info, pushed: 0 }
    }
}

impl Outlet for NullOutlet {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn push_sample(&mut self, values: &[f32], _timestamp: f64) -> EyestreamResult<()> {
        check_width(&self.info, values)?;
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
