//! In-process outlet backed by a shared buffer.

use std::sync::Arc;

use eyestream_common::error::EyestreamResult;
use eyestream_event_model::StreamInfo;
use parking_lot::Mutex;

use crate::{check_width, Outlet};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSample {
    pub timestamp: f64,
    pub values: Vec<f32>,
}

/// Read side of a [`MemoryOutlet`]. Cloning shares the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle {
    samples: Arc<Mutex<Vec<RecordedSample>>>,
}

impl MemoryHandle {
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<RecordedSample> {
        self.samples.lock().clone()
    }

    pub fn last(&self) -> Option<RecordedSample> {
        self.samples.lock().last().cloned()
    }
}

pub struct MemoryOutlet {
    info: StreamInfo,
    handle: MemoryHandle,
}

impl MemoryOutlet {
    pub fn new(info: StreamInfo) -> Self {
        Self {
            info,
            handle: MemoryHandle::default(),
        }
    }

    pub fn handle(&self) -> MemoryHandle {
        self.handle.clone()
    }
}

impl Outlet for MemoryOutlet {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn push_sample(&mut self, values: &[f32], timestamp: f64) -> EyestreamResult<()> {
        check_width(&self.info, values)?;
        self.handle.samples.lock().push(RecordedSample {
            timestamp,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn flush(&mut self) -> EyestreamResult<()> {
        Ok(())
    }

    fn samples_pushed(&self) -> u64 {
        self.handle.len() as u64
    }
}
