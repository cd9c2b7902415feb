//! Four-channel publisher.

use eyestream_common::config::{OutletConfig, OutletSink};
use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::{FrameSamples, OutputChannel};
use tracing::{debug, info};

use crate::{JsonlOutlet, MemoryHandle, MemoryOutlet, NullOutlet, Outlet};

/// One outlet per output channel, indexed by [`OutputChannel::index`].
pub struct Publisher {
    outlets: Vec<Box<dyn Outlet>>,
    published: [u64; 4],
}

impl Publisher {
    /// Assemble a publisher. Outlets must be given in channel order and each
    /// must declare its channel's stream.
    pub fn new(outlets: Vec<Box<dyn Outlet>>) -> EyestreamResult<Self> {
        if outlets.len() != OutputChannel::ALL.len() {
            return Err(EyestreamError::outlet(format!(
                "publisher needs {} outlets, got {}",
                OutputChannel::ALL.len(),
                outlets.len()
            )));
        }
        for (channel, outlet) in OutputChannel::ALL.iter().zip(&outlets) {
            let info = outlet.info();
            if info.name != channel.stream_name() || info.channel_count != channel.channel_count()
            {
                return Err(EyestreamError::outlet(format!(
                    "outlet for {channel} declares {} with {} channels",
                    info.name, info.channel_count
                )));
            }
        }

        Ok(Self {
            outlets,
            published: [0; 4],
        })
    }

    /// Build the outlets named by `config.sink`.
    pub fn from_config(config: &OutletConfig, epoch_wall: &str) -> EyestreamResult<Self> {
        let rate = config.nominal_rate_hz;
        let outlets: Vec<Box<dyn Outlet>> = match config.sink {
            OutletSink::Jsonl => {
                let mut outlets: Vec<Box<dyn Outlet>> = Vec::with_capacity(4);
                for channel in OutputChannel::ALL {
                    let outlet =
                        JsonlOutlet::create(&config.output_dir, channel.stream_info(rate), epoch_wall)?;
                    debug!(path = %outlet.path().display(), "Opened stream file");
                    outlets.push(Box::new(outlet));
                }
                outlets
            }
            OutletSink::None => OutputChannel::ALL
                .iter()
                .map(|c| Box::new(NullOutlet::new(c.stream_info(rate))) as Box<dyn Outlet>)
                .collect(),
            OutletSink::Zmq => zmq_outlets(config)?,
        };

        info!(sink = ?config.sink, rate_hz = rate, "Declared output streams");
        Self::new(outlets)
    }

    /// In-memory publisher plus read handles in channel order.
    pub fn in_memory(nominal_rate_hz: f64) -> (Self, Vec<MemoryHandle>) {
        let outlets: Vec<MemoryOutlet> = OutputChannel::ALL
            .iter()
            .map(|c| MemoryOutlet::new(c.stream_info(nominal_rate_hz)))
            .collect();
        let handles = outlets.iter().map(MemoryOutlet::handle).collect();
        let boxed = outlets
            .into_iter()
            .map(|o| Box::new(o) as Box<dyn Outlet>)
            .collect();

        let publisher = Self {
            outlets: boxed,
            published: [0; 4],
        };
        (publisher, handles)
    }

    /// Push one frame's samples, fixation first, gaze last, all with the
    /// same timestamp.
    pub fn publish(&mut self, samples: &FrameSamples, timestamp: f64) -> EyestreamResult<()> {
        for (channel, sample) in samples.iter() {
            let index = channel.index();
            self.outlets[index].push_sample(sample.values(), timestamp)?;
            self.published[index] += 1;
        }
        Ok(())
    }

    /// Samples published per channel, in channel order.
    pub fn samples_published(&self) -> [u64; 4] {
        self.published
    }

    pub fn flush(&mut self) -> EyestreamResult<()> {
        for outlet in &mut self.outlets {
            outlet.flush()?;
        }
        Ok(())
    }
}

#[cfg(feature = "zmq")]
fn zmq_outlets(config: &OutletConfig) -> EyestreamResult<Vec<Box<dyn Outlet>>> {
    use crate::{ZmqPubOutlet, ZmqPublisherSocket};

    let socket = ZmqPublisherSocket::bind(&config.pub_address)?;
    Ok(OutputChannel::ALL
        .iter()
        .map(|c| {
            Box::new(ZmqPubOutlet::new(
                socket.clone(),
                c.stream_info(config.nominal_rate_hz),
            )) as Box<dyn Outlet>
        })
        .collect())
}

#[cfg(not(feature = "zmq"))]
fn zmq_outlets(_config: &OutletConfig) -> EyestreamResult<Vec<Box<dyn Outlet>>> {
    Err(EyestreamError::unsupported(
        "zmq outlets require the `zmq` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyestream_event_model::{EventSample, GazeSample, Vec3};

    #[test]
    fn publishes_one_sample_per_channel_with_shared_timestamp() {
        let (mut publisher, handles) = Publisher::in_memory(30.0);
        let mut samples = FrameSamples::quiet(GazeSample::new(100.0, 300.0));
        samples.fixation = EventSample::position(Vec3::new(1.0, 2.0, 3.0));

        publisher.publish(&samples, 0.5).unwrap();
        publisher.publish(&FrameSamples::quiet(GazeSample::new(0.0, 0.0)), 0.6).unwrap();

        assert_eq!(publisher.samples_published(), [2, 2, 2, 2]);
        for handle in &handles {
            let recorded = handle.snapshot();
            assert_eq!(recorded.len(), 2);
            assert_eq!(recorded[0].timestamp, 0.5);
            assert_eq!(recorded[1].timestamp, 0.6);
        }
        assert_eq!(handles[0].snapshot()[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(handles[2].snapshot()[0].values, vec![-1.0]);
    }

    #[test]
    fn rejects_outlets_out_of_channel_order() {
        let outlets: Vec<Box<dyn Outlet>> = [
            OutputChannel::Saccade,
            OutputChannel::Fixation,
            OutputChannel::Blink,
            OutputChannel::Gaze,
        ]
        .iter()
        .map(|c| Box::new(NullOutlet::new(c.stream_info(30.0))) as Box<dyn Outlet>)
        .collect();

        assert!(Publisher::new(outlets).is_err());
    }

    #[test]
    fn rejects_wrong_outlet_count() {
        let outlets: Vec<Box<dyn Outlet>> =
            vec![Box::new(NullOutlet::new(OutputChannel::Fixation.stream_info(30.0)))];
        assert!(Publisher::new(outlets).is_err());
    }
}
