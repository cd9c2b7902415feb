//! Clock and timing utilities.
//!
//! Every sample a session publishes is stamped with seconds elapsed on a
//! monotonic clock anchored when the session starts. All four samples of
//! one frame share one stamp.

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Rate limiter for periodic work inside the frame loop.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller that ticks at most once per `interval_secs`.
    pub fn every_secs(interval_secs: f64) -> Self {
        Self {
            target_interval_ns: (interval_secs.max(0.0) * 1_000_000_000.0) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }
}
