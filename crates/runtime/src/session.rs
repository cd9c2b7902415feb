//! The processing loop.
//!
//! One [`EngineSession`] owns everything the loop touches: the ingestor, the
//! detection engine with its two windows, the publisher, the gaze marker and
//! the optional overlay. Each accepted frame goes through, in order:
//!
//! 1. read the marker (payload for fixation/saccade)
//! 2. commit the frame to the engine and classify
//! 3. publish all four channels with one timestamp
//! 4. move the marker onto the gaze point
//! 5. draw the overlay, best effort
//!
//! Frame-local errors skip the frame before step 1. Any other error ends
//! the session after being logged.

use std::time::Duration;

use eyestream_common::clock::{RateController, SessionClock};
use eyestream_common::config::AppConfig;
use eyestream_common::error::EyestreamResult;
use eyestream_detection::EyeEventEngine;
use eyestream_ingest::{FrameDecoder, FrameIngestor, FrameSource, Ingested};
use eyestream_outlet::Publisher;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::overlay::DiagnosticOverlay;
use crate::scene::{GazeMarker, SceneProxy};

const STATUS_INTERVAL_SECS: f64 = 5.0;

/// Why a session stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled,
    SourceClosed,
    DisplayClosed,
}

/// Counters returned when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames_received: u64,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    /// Samples published per channel, in channel order.
    pub samples_per_channel: [u64; 4],
    pub stop_reason: StopReason,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            frames_received: 0,
            frames_processed: 0,
            frames_skipped: 0,
            samples_per_channel: [0; 4],
            stop_reason: StopReason::SourceClosed,
        }
    }
}

pub struct EngineSession {
    ingestor: FrameIngestor,
    engine: EyeEventEngine,
    publisher: Publisher,
    marker: GazeMarker,
    overlay: Option<DiagnosticOverlay>,
    clock: SessionClock,
    poll_timeout: Duration,
    status: RateController,
}

impl EngineSession {
    pub fn new(
        ingestor: FrameIngestor,
        engine: EyeEventEngine,
        publisher: Publisher,
        marker: GazeMarker,
    ) -> Self {
        Self {
            ingestor,
            engine,
            publisher,
            marker,
            overlay: None,
            clock: SessionClock::start(),
            poll_timeout: Duration::from_millis(100),
            status: RateController::every_secs(STATUS_INTERVAL_SECS),
        }
    }

    /// Assemble a session from configuration: outlets per `outlets.sink`,
    /// overlay per `overlay`, marker named `detection.marker_name`.
    pub fn from_config(
        config: &AppConfig,
        source: Box<dyn FrameSource>,
        scene: Box<dyn SceneProxy>,
    ) -> EyestreamResult<Self> {
        config.validate()?;

        let clock = SessionClock::start();
        let decoder = FrameDecoder::new(&config.image, config.transport.gaze_layout);
        let engine = EyeEventEngine::new(&config.detection, &config.image);
        let publisher = Publisher::from_config(&config.outlets, clock.epoch_wall())?;
        let marker = GazeMarker::new(scene, config.detection.marker_name.clone());
        let overlay =
            DiagnosticOverlay::from_config(&config.overlay, config.image.width, config.image.height)?;

        Ok(
            Self::new(FrameIngestor::new(source, decoder), engine, publisher, marker)
                .with_clock(clock)
                .with_overlay(overlay)
                .with_poll_timeout(Duration::from_millis(config.transport.poll_timeout_ms)),
        )
    }

    pub fn with_overlay(mut self, overlay: Option<DiagnosticOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// How long one receive waits before the loop re-checks cancellation.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Use an already started clock, so outlet headers and sample stamps
    /// share one epoch.
    pub fn with_clock(mut self, clock: SessionClock) -> Self {
        self.clock = clock;
        self
    }

    /// Run until cancelled, the source closes, or a fatal error occurs.
    ///
    /// Outlets are flushed on every exit path. Consumes the session so the
    /// transport and display are released when this returns.
    pub fn run(mut self, cancel: &CancellationToken) -> EyestreamResult<SessionStats> {
        info!(
            source = self.ingestor.source_name(),
            marker = self.marker.name(),
            epoch = self.clock.epoch_wall(),
            "Session started"
        );

        let mut stats = SessionStats::new();
        let outcome = self.run_loop(cancel, &mut stats);
        let flushed = self.publisher.flush();
        stats.samples_per_channel = self.publisher.samples_published();

        match outcome {
            Ok(reason) => {
                flushed?;
                stats.stop_reason = reason;
                info!(
                    reason = ?reason,
                    received = stats.frames_received,
                    processed = stats.frames_processed,
                    skipped = stats.frames_skipped,
                    "Session stopped"
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(flush_err) = flushed {
                    warn!(error = %flush_err, "Flush failed during shutdown");
                }
                error!(
                    error = %e,
                    processed = stats.frames_processed,
                    "Session aborted"
                );
                Err(e)
            }
        }
    }

    fn run_loop(
        &mut self,
        cancel: &CancellationToken,
        stats: &mut SessionStats,
    ) -> EyestreamResult<StopReason> {
        loop {
            if cancel.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }

            let frame = match self.ingestor.next_frame(self.poll_timeout)? {
                Ingested::Frame(frame) => frame,
                Ingested::Skipped { sequence, error } => {
                    stats.frames_received += 1;
                    stats.frames_skipped += 1;
                    warn!(frame = sequence, kind = error.kind(), error = %error, "Skipping frame");
                    continue;
                }
                Ingested::Idle => {
                    self.log_status(stats);
                    continue;
                }
                Ingested::Closed => return Ok(StopReason::SourceClosed),
            };
            stats.frames_received += 1;

            // Nothing of this frame has been committed yet.
            if cancel.is_cancelled() {
                debug!(frame = frame.sequence, "Dropping frame received after cancellation");
                return Ok(StopReason::Cancelled);
            }

            let marker = self.marker.read()?;
            let detection = self.engine.process(&frame, marker);
            self.publisher
                .publish(&detection.samples(), self.clock.elapsed_secs())?;
            self.marker.follow(detection.gaze)?;
            stats.frames_processed += 1;

            if detection.any_event() {
                debug!(
                    frame = frame.sequence,
                    fixation = detection.fixation.fired(),
                    saccade = detection.saccade.fired(),
                    blink = detection.blink.fired(),
                    "Event detected"
                );
            }

            if let Some(overlay) = self.overlay.as_mut() {
                if overlay.present(&frame.image, detection.gaze) {
                    cancel.cancel();
                    return Ok(StopReason::DisplayClosed);
                }
            }

            self.log_status(stats);
        }
    }

    fn log_status(&mut self, stats: &SessionStats) {
        if self.status.should_tick(self.clock.elapsed_ns()) {
            let [fixation, saccade, blink, gaze] = self.publisher.samples_published();
            info!(
                received = stats.frames_received,
                processed = stats.frames_processed,
                skipped = stats.frames_skipped,
                fixation,
                saccade,
                blink,
                gaze,
                "Session status"
            );
        }
    }
}
