pub mod check;
pub mod config;
pub mod run;
pub mod simulate;

use eyestream_common::config::AppConfig;
use eyestream_runtime::SessionStats;
use eyestream_event_model::OutputChannel;

/// Apply detection flags shared by `run` and `simulate`.
pub fn apply_detection_overrides(
    config: &mut AppConfig,
    threshold: Option<f64>,
    history_size: Option<usize>,
) {
    if let Some(threshold) = threshold {
        config.detection.threshold = threshold;
    }
    if let Some(history_size) = history_size {
        config.detection.history_size = history_size;
    }
}

pub fn print_stats(stats: &SessionStats) {
    println!("Session stopped: {:?}", stats.stop_reason);
    println!("  Frames received:  {}", stats.frames_received);
    println!("  Frames processed: {}", stats.frames_processed);
    println!("  Frames skipped:   {}", stats.frames_skipped);
    for channel in OutputChannel::ALL {
        println!(
            "  {:<18} {} samples",
            channel.stream_name(),
            stats.samples_per_channel[channel.index()]
        );
    }
}
