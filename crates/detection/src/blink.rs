//! Blink classification from eye-patch intensity.
//!
//! Each frame contributes one value to the intensity window: the mean luma
//! of a patch of `patch.width x patch.height` pixels centred on the current
//! gaze coordinate. Near the edges the patch is shifted, not shrunk, so it
//! always lies inside the image; it is only shrunk when the image itself is
//! smaller than the patch. Luma uses Rec. 709 weights.
//!
//! A blink fires when the population standard deviation of the full
//! intensity window is below the threshold.

use eyestream_common::config::PatchDimensions;
use eyestream_event_model::GazeSample;
use image::{GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};

use crate::displacement::Verdict;
use crate::history::HistoryBuffer;

/// Pixel rectangle inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PatchRegion {
    /// Region of `patch` size centred on `center`, kept inside an
    /// `image_width x image_height` frame.
    pub fn around(
        center: GazeSample,
        patch: PatchDimensions,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let width = patch.width.min(image_width).max(1);
        let height = patch.height.min(image_height).max(1);

        let x = clamp_origin(center.x, width, image_width);
        let y = clamp_origin(center.y, height, image_height);

        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Top-left coordinate of a span of `span` pixels centred on `center`,
/// constrained to `[0, extent - span]`.
fn clamp_origin(center: f64, span: u32, extent: u32) -> u32 {
    let max_origin = extent.saturating_sub(span) as f64;
    let origin = (center - span as f64 / 2.0).round();
    origin.clamp(0.0, max_origin) as u32
}

/// Mean Rec. 709 luma over `region` (clipped to the image), in `[0, 255]`.
pub fn mean_luminance(image: &RgbImage, region: PatchRegion) -> f64 {
    let x = region.x.min(image.width());
    let y = region.y.min(image.height());
    let width = region.width.min(image.width() - x);
    let height = region.height.min(image.height() - y);
    let area = width as u64 * height as u64;
    if area == 0 {
        return 0.0;
    }

    let view = image.view(x, y, width, height);
    let total: f64 = view
        .pixels()
        .map(|(_, _, pixel)| {
            let [r, g, b] = pixel.0;
            0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
        })
        .sum();

    total / area as f64
}

/// Population standard deviation. Returns `None` for an empty input.
pub fn population_stddev<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<f64> {
    let values: Vec<f64> = values.into_iter().copied().collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Low intensity variance over the window.
#[derive(Debug, Clone, Copy)]
pub struct BlinkDetector {
    threshold: f64,
}

impl BlinkDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, window: &HistoryBuffer<f64>) -> Verdict {
        if !window.is_full() {
            return Verdict::Pending;
        }
        let Some(metric) = population_stddev(window.iter()) else {
            return Verdict::Pending;
        };

        if metric < self.threshold {
            Verdict::Fired { metric }
        } else {
            Verdict::Quiet { metric }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const PATCH: PatchDimensions = PatchDimensions {
        width: 63,
        height: 111,
    };

    #[test]
    fn patch_is_centred_away_from_edges() {
        let region = PatchRegion::around(GazeSample::new(200.0, 200.0), PATCH, 400, 400);
        assert_eq!(region.width, 63);
        assert_eq!(region.height, 111);
        // 200 - 31.5 = 168.5, rounded half away from zero
        assert_eq!(region.x, 169);
        // 200 - 55.5 = 144.5
        assert_eq!(region.y, 145);
    }

    #[test]
    fn patch_shifts_inside_at_edges() {
        let top_left = PatchRegion::around(GazeSample::new(-50.0, 2.0), PATCH, 400, 400);
        assert_eq!((top_left.x, top_left.y), (0, 0));

        let bottom_right = PatchRegion::around(GazeSample::new(399.0, 400.0), PATCH, 400, 400);
        assert_eq!(bottom_right.x + bottom_right.width, 400);
        assert_eq!(bottom_right.y + bottom_right.height, 400);
    }

    #[test]
    fn patch_shrinks_only_for_tiny_images() {
        let region = PatchRegion::around(GazeSample::new(10.0, 10.0), PATCH, 32, 48);
        assert_eq!(region, PatchRegion { x: 0, y: 0, width: 32, height: 48 });
    }

    #[test]
    fn mean_luminance_of_uniform_patch() {
        let image = RgbImage::from_pixel(40, 40, Rgb([100, 100, 100]));
        let region = PatchRegion { x: 5, y: 5, width: 10, height: 10 };
        assert!((mean_luminance(&image, region) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn mean_luminance_ignores_pixels_outside_region() {
        let mut image = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        for y in 0..10 {
            for x in 0..10 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let bright = PatchRegion { x: 0, y: 0, width: 10, height: 10 };
        let dark = PatchRegion { x: 10, y: 10, width: 10, height: 10 };
        assert!((mean_luminance(&image, bright) - 255.0).abs() < 1e-9);
        assert_eq!(mean_luminance(&image, dark), 0.0);
    }

    #[test]
    fn stddev_is_population_form() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_stddev(values.iter()).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(population_stddev(std::iter::empty::<&f64>()), None);
    }

    #[test]
    fn steady_intensity_fires_blink() {
        let mut window = HistoryBuffer::new(4);
        for v in [120.0, 120.2, 119.9, 120.1] {
            window.push(v);
        }
        assert!(BlinkDetector::new(0.7).evaluate(&window).fired());
    }

    #[test]
    fn varying_intensity_does_not_fire() {
        let mut window = HistoryBuffer::new(4);
        for v in [40.0, 200.0, 60.0, 180.0] {
            window.push(v);
        }
        let verdict = BlinkDetector::new(0.7).evaluate(&window);
        assert!(!verdict.fired());
        assert!(verdict.metric().unwrap() > 0.7);
    }

    #[test]
    fn blink_waits_for_full_window() {
        let mut window = HistoryBuffer::new(4);
        window.push(1.0);
        assert_eq!(BlinkDetector::new(0.7).evaluate(&window), Verdict::Pending);
    }
}
