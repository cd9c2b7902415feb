//! Frame decoding.

use std::io::Cursor;

use eyestream_common::config::{GazePayloadLayout, ImageConfig};
use eyestream_common::error::FrameError;
use eyestream_event_model::Frame;
use image::{ImageFormat, RgbImage};

use crate::gaze::GazeCodec;
use crate::MultipartMessage;

/// Parts in a frame message: topic, metadata, image, gaze.
pub const FRAME_PARTS: usize = 4;

const IMAGE_PART: usize = 2;
const GAZE_PART: usize = 3;

/// Validates and decodes multi-part frame messages.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    width: u32,
    height: u32,
    channels: u8,
    gaze: GazeCodec,
}

impl FrameDecoder {
    pub fn new(image: &ImageConfig, layout: GazePayloadLayout) -> Self {
        Self {
            width: image.width,
            height: image.height,
            channels: image.channels,
            gaze: GazeCodec::new(layout),
        }
    }

    /// Decode a message into a frame, or explain why it was rejected.
    pub fn decode(&self, sequence: u64, message: &MultipartMessage) -> Result<Frame, FrameError> {
        if message.len() < FRAME_PARTS {
            return Err(FrameError::transport(format!(
                "message has {} parts, expected {FRAME_PARTS}",
                message.len()
            )));
        }
        if message.len() > FRAME_PARTS {
            tracing::debug!(
                frame = sequence,
                parts = message.len(),
                "Ignoring trailing message parts"
            );
        }

        let image = self.decode_image(&message.parts[IMAGE_PART])?;
        let gaze_raw = self.gaze.decode(&message.parts[GAZE_PART])?;

        Ok(Frame::new(sequence, image, gaze_raw))
    }

    fn decode_image(&self, bytes: &[u8]) -> Result<RgbImage, FrameError> {
        if bytes.is_empty() {
            return Err(FrameError::decode("image buffer is empty"));
        }

        let decoded =
            image::load_from_memory(bytes).map_err(|e| FrameError::decode(e.to_string()))?;

        if decoded.width() != self.width || decoded.height() != self.height {
            return Err(FrameError::decode(format!(
                "decoded {}x{} image, expected {}x{}",
                decoded.width(),
                decoded.height(),
                self.width,
                self.height
            )));
        }

        let channels = decoded.color().channel_count();
        if channels != self.channels {
            return Err(FrameError::decode(format!(
                "decoded image has {channels} channels, expected {}",
                self.channels
            )));
        }

        Ok(decoded.to_rgb8())
    }
}

/// PNG-encode an RGB frame, as an upstream producer would.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use eyestream_event_model::RawGaze;
    use image::{GrayImage, Luma, Rgb};

    pub(crate) fn encoded_frame_message(
        width: u32,
        height: u32,
        gaze_x: i16,
        gaze_y: i16,
    ) -> MultipartMessage {
        let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let gaze = GazeCodec::new(GazePayloadLayout::Wide).encode(RawGaze::new(gaze_x, gaze_y));
        MultipartMessage::frame("CamCapture", b"{}".to_vec(), encode_png(&image).unwrap(), gaze)
    }

    fn decoder(width: u32, height: u32) -> FrameDecoder {
        FrameDecoder::new(
            &ImageConfig {
                width,
                height,
                ..Default::default()
            },
            GazePayloadLayout::Wide,
        )
    }

    #[test]
    fn decodes_well_formed_message() {
        let message = encoded_frame_message(16, 12, 5, 6);
        let frame = decoder(16, 12).decode(42, &message).unwrap();
        assert_eq!(frame.sequence, 42);
        assert_eq!((frame.width(), frame.height()), (16, 12));
        assert_eq!(frame.gaze_raw, RawGaze::new(5, 6));
        assert_eq!(frame.image.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn short_message_is_transport_error() {
        let mut message = encoded_frame_message(16, 12, 5, 6);
        message.parts.truncate(3);
        let err = decoder(16, 12).decode(0, &message).unwrap_err();
        assert!(matches!(err, FrameError::Transport { .. }));
    }

    #[test]
    fn trailing_parts_are_ignored() {
        let mut message = encoded_frame_message(16, 12, 5, 6);
        message.parts.push(b"extra".to_vec());
        assert!(decoder(16, 12).decode(0, &message).is_ok());
    }

    #[test]
    fn garbage_image_is_decode_error() {
        let mut message = encoded_frame_message(16, 12, 5, 6);
        message.parts[IMAGE_PART] = vec![0xde, 0xad, 0xbe, 0xef];
        let err = decoder(16, 12).decode(0, &message).unwrap_err();
        assert!(matches!(err, FrameError::Decode { .. }));
    }

    #[test]
    fn wrong_dimensions_are_decode_error() {
        let message = encoded_frame_message(16, 12, 5, 6);
        let err = decoder(400, 400).decode(0, &message).unwrap_err();
        assert!(err.to_string().contains("expected 400x400"));
    }

    #[test]
    fn wrong_channel_count_is_decode_error() {
        let gray = GrayImage::from_pixel(16, 12, Luma([80]));
        let mut png = Vec::new();
        gray.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let mut message = encoded_frame_message(16, 12, 5, 6);
        message.parts[IMAGE_PART] = png;

        let err = decoder(16, 12).decode(0, &message).unwrap_err();
        assert!(matches!(err, FrameError::Decode { .. }));
    }

    #[test]
    fn bad_gaze_payload_is_unpack_error() {
        let mut message = encoded_frame_message(16, 12, 5, 6);
        message.parts[GAZE_PART] = vec![1, 2, 3];
        let err = decoder(16, 12).decode(0, &message).unwrap_err();
        assert!(matches!(err, FrameError::Unpack { .. }));
    }
}
