//! The per-frame detection engine.
//!
//! [`EyeEventEngine`] owns both sliding windows. Each accepted frame is
//! pushed into the windows exactly once, and only then are the classifiers
//! run, so every classifier sees the window including the current frame.
//! Frames that fail upstream never reach the engine and leave the windows
//! untouched.

use eyestream_common::config::{DetectionConfig, ImageConfig};
use eyestream_event_model::{
    EventSample, Frame, FrameSamples, GazeSample, Vec3, BLINK_FLAG,
};

use crate::blink::{mean_luminance, BlinkDetector, PatchRegion};
use crate::displacement::{anchored_displacement, FixationDetector, SaccadeDetector, Verdict};
use crate::history::HistoryBuffer;

/// Everything the engine concluded about one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub sequence: u64,

    /// Normalized gaze coordinate of this frame.
    pub gaze: GazeSample,

    /// Region the blink intensity was measured over.
    pub patch: PatchRegion,

    /// Mean patch luma pushed into the intensity window.
    pub intensity: f64,

    pub fixation: Verdict,
    pub saccade: Verdict,
    pub blink: Verdict,

    /// Oldest- and newest-anchored displacement expressed in degrees of
    /// visual angle, once the gaze window is full.
    pub fixation_deg: Option<f64>,
    pub saccade_deg: Option<f64>,

    /// Scene marker position used as the fixation/saccade payload.
    pub marker: Vec3,
}

impl Detection {
    /// The four output samples for this frame. Channels that did not fire
    /// carry the sentinel.
    pub fn samples(&self) -> FrameSamples {
        let mut samples = FrameSamples::quiet(self.gaze);
        if self.fixation.fired() {
            samples.fixation = EventSample::position(self.marker);
        }
        if self.saccade.fired() {
            samples.saccade = EventSample::position(self.marker);
        }
        if self.blink.fired() {
            samples.blink = EventSample::flag(BLINK_FLAG);
        }
        samples
    }

    /// Whether any of the three event channels fired.
    pub fn any_event(&self) -> bool {
        self.fixation.fired() || self.saccade.fired() || self.blink.fired()
    }
}

/// Stateful classifier over a stream of frames.
#[derive(Debug, Clone)]
pub struct EyeEventEngine {
    config: DetectionConfig,
    image_height: u32,
    pixels_per_degree: (f64, f64),
    gaze_history: HistoryBuffer<GazeSample>,
    intensity_history: HistoryBuffer<f64>,
    fixation: FixationDetector,
    saccade: SaccadeDetector,
    blink: BlinkDetector,
    frames_processed: u64,
}

impl EyeEventEngine {
    pub fn new(detection: &DetectionConfig, image: &ImageConfig) -> Self {
        Self {
            config: detection.clone(),
            image_height: image.height,
            pixels_per_degree: image.pixels_per_degree(),
            gaze_history: HistoryBuffer::new(detection.history_size),
            intensity_history: HistoryBuffer::new(detection.history_size),
            fixation: FixationDetector::new(detection.threshold),
            saccade: SaccadeDetector::new(detection.threshold),
            blink: BlinkDetector::new(detection.threshold),
            frames_processed: 0,
        }
    }

    /// Commit one frame to the windows and classify.
    ///
    /// `marker` is the scene marker position as it stood before this frame
    /// updates it.
    pub fn process(&mut self, frame: &Frame, marker: Vec3) -> Detection {
        let gaze = frame.gaze_raw.normalize(self.image_height);
        let patch = PatchRegion::around(gaze, self.config.patch, frame.width(), frame.height());
        let intensity = mean_luminance(&frame.image, patch);

        self.gaze_history.push(gaze);
        self.intensity_history.push(intensity);
        self.frames_processed += 1;

        let fixation = self.fixation.evaluate(&self.gaze_history);
        let saccade = self.saccade.evaluate(&self.gaze_history);
        let blink = self.blink.evaluate(&self.intensity_history);
        let (fixation_deg, saccade_deg) = self.angular_displacements();

        tracing::trace!(
            frame = frame.sequence,
            x = gaze.x,
            y = gaze.y,
            intensity,
            fixation = ?fixation,
            saccade = ?saccade,
            blink = ?blink,
            fixation_deg = ?fixation_deg,
            saccade_deg = ?saccade_deg,
            "Classified frame"
        );

        Detection {
            sequence: frame.sequence,
            gaze,
            patch,
            intensity,
            fixation,
            saccade,
            blink,
            fixation_deg,
            saccade_deg,
            marker,
        }
    }

    /// Displacement metrics recomputed on samples scaled to degrees.
    fn angular_displacements(&self) -> (Option<f64>, Option<f64>) {
        if !self.gaze_history.is_full() {
            return (None, None);
        }
        let (ppd_x, ppd_y) = self.pixels_per_degree;
        let angular: Vec<GazeSample> = self
            .gaze_history
            .iter()
            .map(|s| GazeSample::new(s.x / ppd_x, s.y / ppd_y))
            .collect();

        match (angular.first(), angular.last()) {
            (Some(oldest), Some(newest)) => (
                Some(anchored_displacement(&angular, oldest)),
                Some(anchored_displacement(&angular, newest)),
            ),
            _ => (None, None),
        }
    }

    pub fn gaze_history(&self) -> &HistoryBuffer<GazeSample> {
        &self.gaze_history
    }

    pub fn intensity_history(&self) -> &HistoryBuffer<f64> {
        &self.intensity_history
    }

    /// Frames committed since construction or the last reset.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Drop all window contents.
    pub fn reset(&mut self) {
        self.gaze_history.clear();
        self.intensity_history.clear();
        self.frames_processed = 0;
    }
}
