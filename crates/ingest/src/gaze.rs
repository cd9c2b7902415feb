//! Gaze payload codec.

use byteorder::{ByteOrder, NativeEndian};
use eyestream_common::config::GazePayloadLayout;
use eyestream_common::error::FrameError;
use eyestream_event_model::RawGaze;

/// Reads and writes the gaze part of a frame message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeCodec {
    layout: GazePayloadLayout,
}

impl GazeCodec {
    pub fn new(layout: GazePayloadLayout) -> Self {
        Self { layout }
    }

    /// Exact payload size in bytes.
    pub fn payload_len(&self) -> usize {
        match self.layout {
            GazePayloadLayout::Wide => 8,
            GazePayloadLayout::Packed => 4,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<RawGaze, FrameError> {
        if bytes.len() != self.payload_len() {
            return Err(FrameError::unpack(format!(
                "gaze payload is {} bytes, expected {} ({:?} layout)",
                bytes.len(),
                self.payload_len(),
                self.layout
            )));
        }

        match self.layout {
            GazePayloadLayout::Packed => Ok(RawGaze::new(
                NativeEndian::read_i16(&bytes[0..2]),
                NativeEndian::read_i16(&bytes[2..4]),
            )),
            GazePayloadLayout::Wide => {
                let x = narrow(NativeEndian::read_i32(&bytes[0..4]), "x")?;
                let y = narrow(NativeEndian::read_i32(&bytes[4..8]), "y")?;
                Ok(RawGaze::new(x, y))
            }
        }
    }

    pub fn encode(&self, gaze: RawGaze) -> Vec<u8> {
        let mut bytes = vec![0u8; self.payload_len()];
        match self.layout {
            GazePayloadLayout::Packed => {
                NativeEndian::write_i16(&mut bytes[0..2], gaze.x);
                NativeEndian::write_i16(&mut bytes[2..4], gaze.y);
            }
            GazePayloadLayout::Wide => {
                NativeEndian::write_i32(&mut bytes[0..4], gaze.x as i32);
                NativeEndian::write_i32(&mut bytes[4..8], gaze.y as i32);
            }
        }
        bytes
    }
}

fn narrow(value: i32, axis: &str) -> Result<i16, FrameError> {
    i16::try_from(value).map_err(|_| {
        FrameError::unpack(format!("gaze {axis} = {value} does not fit in 16 bits"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_layout_reads_native_i32_pair() {
        let mut bytes = [0u8; 8];
        NativeEndian::write_i32(&mut bytes[0..4], 100);
        NativeEndian::write_i32(&mut bytes[4..8], -7);

        let codec = GazeCodec::new(GazePayloadLayout::Wide);
        assert_eq!(codec.decode(&bytes).unwrap(), RawGaze::new(100, -7));
    }

    #[test]
    fn packed_layout_reads_native_i16_pair() {
        let codec = GazeCodec::new(GazePayloadLayout::Packed);
        let bytes = codec.encode(RawGaze::new(-300, 250));
        assert_eq!(bytes.len(), 4);
        assert_eq!(codec.decode(&bytes).unwrap(), RawGaze::new(-300, 250));
    }

    #[test]
    fn wrong_length_is_unpack_error() {
        let codec = GazeCodec::new(GazePayloadLayout::Wide);
        for len in [0usize, 4, 7, 9, 16] {
            let err = codec.decode(&vec![0u8; len]).unwrap_err();
            assert_eq!(err.kind(), "unpack", "len {len}");
        }
    }

    #[test]
    fn out_of_range_wide_value_is_unpack_error() {
        let mut bytes = [0u8; 8];
        NativeEndian::write_i32(&mut bytes[0..4], 40_000);
        let err = GazeCodec::new(GazePayloadLayout::Wide)
            .decode(&bytes)
            .unwrap_err();
        assert!(matches!(err, FrameError::Unpack { .. }));
    }
}
