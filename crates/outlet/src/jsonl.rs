//! Append-only JSONL outlet.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::StreamInfo;
use serde::Serialize;

use crate::{check_width, Outlet};

/// First line of every stream file, prefixed with `# `.
#[derive(Debug, Serialize)]
struct StreamHeader<'a> {
    #[serde(flatten)]
    info: &'a StreamInfo,
    epoch_wall: &'a str,
}

#[derive(Debug, Serialize)]
struct SampleLine<'a> {
    t: f64,
    v: &'a [f32],
}

/// Writes one stream to `<dir>/<stream name>.jsonl`.
pub struct JsonlOutlet {
    info: StreamInfo,
    writer: BufWriter<File>,
    path: PathBuf,
    samples_written: u64,
}

impl JsonlOutlet {
    /// Create (or truncate) the stream file and write its header.
    pub fn create(dir: &Path, info: StreamInfo, epoch_wall: &str) -> EyestreamResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.jsonl", info.name));

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let header = serde_json::to_string(&StreamHeader {
            info: &info,
            epoch_wall,
        })?;
        writeln!(writer, "# {header}")
            .map_err(|e| EyestreamError::outlet(format!("Failed to write header: {e}")))?;

        Ok(Self {
            info,
            writer,
            path,
            samples_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Outlet for JsonlOutlet {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn push_sample(&mut self, values: &[f32], timestamp: f64) -> EyestreamResult<()> {
        check_width(&self.info, values)?;

        let line = serde_json::to_string(&SampleLine {
            t: timestamp,
            v: values,
        })?;
        writeln!(self.writer, "{line}")
            .map_err(|e| EyestreamError::outlet(format!("Failed to write sample: {e}")))?;
        self.samples_written += 1;

        if self.samples_written % 1000 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> EyestreamResult<()> {
        self.writer
            .flush()
            .map_err(|e| EyestreamError::outlet(format!("Failed to flush {}: {e}", self.info.name)))
    }

    fn samples_pushed(&self) -> u64 {
        self.samples_written
    }
}

impl Drop for JsonlOutlet {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
