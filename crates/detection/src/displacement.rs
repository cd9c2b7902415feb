//! Fixation and saccade classification.
//!
//! Both classifiers use the same metric, anchored at opposite ends of the
//! gaze window:
//!
//! ```text
//! d(anchor) = sqrt( sum over window of |sample - anchor|^2 )
//! ```
//!
//! This is a root of the *sum* of squared distances, not a mean or RMS.
//! The value grows with the window size, so thresholds tuned for one
//! `history_size` do not transfer unchanged to another.
//!
//! Fixation anchors at the oldest sample and fires on `d < threshold`.
//! Saccade anchors at the newest sample and fires on `d > threshold`.
//! The two are evaluated independently and may fire on the same frame.

use eyestream_event_model::GazeSample;

use crate::history::HistoryBuffer;

/// Outcome of one classifier on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// The window is not full yet.
    Pending,
    /// Evaluated, did not fire.
    Quiet { metric: f64 },
    /// Evaluated and fired.
    Fired { metric: f64 },
}

impl Verdict {
    pub fn fired(&self) -> bool {
        matches!(self, Verdict::Fired { .. })
    }

    /// The evaluated metric, if the window was full.
    pub fn metric(&self) -> Option<f64> {
        match self {
            Verdict::Pending => None,
            Verdict::Quiet { metric } | Verdict::Fired { metric } => Some(*metric),
        }
    }
}

/// Root of the summed squared distances from every sample to `anchor`.
pub fn anchored_displacement<'a>(
    samples: impl IntoIterator<Item = &'a GazeSample>,
    anchor: &GazeSample,
) -> f64 {
    samples
        .into_iter()
        .map(|sample| sample.distance_sq(anchor))
        .sum::<f64>()
        .sqrt()
}

/// Near-static gaze over the window.
#[derive(Debug, Clone, Copy)]
pub struct FixationDetector {
    threshold: f64,
}

impl FixationDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, window: &HistoryBuffer<GazeSample>) -> Verdict {
        if !window.is_full() {
            return Verdict::Pending;
        }
        let Some(anchor) = window.oldest() else {
            return Verdict::Pending;
        };

        let metric = anchored_displacement(window.iter(), anchor);
        if metric < self.threshold {
            Verdict::Fired { metric }
        } else {
            Verdict::Quiet { metric }
        }
    }
}

/// Rapid displacement relative to where the gaze is now.
#[derive(Debug, Clone, Copy)]
pub struct SaccadeDetector {
    threshold: f64,
}

impl SaccadeDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, window: &HistoryBuffer<GazeSample>) -> Verdict {
        if !window.is_full() {
            return Verdict::Pending;
        }
        let Some(anchor) = window.newest() else {
            return Verdict::Pending;
        };

        let metric = anchored_displacement(window.iter(), anchor);
        if metric > self.threshold {
            Verdict::Fired { metric }
        } else {
            Verdict::Quiet { metric }
        }
    }
}
