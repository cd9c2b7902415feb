//! Feed synthetic frames through the engine.
//!
//! Frames are rendered in-process, PNG-encoded and paired with a gaze
//! payload exactly as an upstream camera publisher would send them, then
//! replayed through a scripted source into a normal session.

use std::path::{Path, PathBuf};

use anyhow::Context;
use eyestream_common::config::{AppConfig, DisplayKind, OutletSink};
use eyestream_event_model::{OutputChannel, RawGaze, Vec3, NO_EVENT};
use eyestream_ingest::decode::encode_png;
use eyestream_ingest::{GazeCodec, MultipartMessage, ScriptedSource};
use eyestream_runtime::{CancellationToken, EngineSession, InMemoryScene};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_ellipse_mut;

const BACKGROUND: Rgb<u8> = Rgb([40, 40, 50]);
const CLOSED_EYE_SHADE: u8 = 30;
const BLINK_PHASE_FRAMES: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Gaze held on one point
    Fixation,
    /// Gaze sweeping across the frame
    Saccade,
    /// Steady gaze with the eye alternately open and closed
    Blink,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Self::Fixation => "fixation",
            Self::Saccade => "saccade",
            Self::Blink => "blink",
        }
    }

    /// Gaze position in image coordinates (row 0 at the top).
    fn gaze_position(self, frame: usize, width: u32, height: u32) -> (u32, u32) {
        let (cx, cy) = (width / 2, height / 2);
        match self {
            Self::Fixation | Self::Blink => (cx, cy),
            Self::Saccade => {
                let margin = width / 10;
                let span = width.saturating_sub(2 * margin).max(1);
                (margin + ((frame * 25) % span as usize) as u32, cy)
            }
        }
    }

    /// Brightness of the eye region. An open eye flickers; a closed eye is
    /// flat and dark.
    fn eye_shade(self, frame: usize) -> u8 {
        let open = 140 + ((frame * 37) % 60) as u8;
        match self {
            Self::Blink if (frame / BLINK_PHASE_FRAMES) % 2 == 1 => CLOSED_EYE_SHADE,
            _ => open,
        }
    }
}

pub fn run(
    mut config: AppConfig,
    frames: usize,
    scenario: Scenario,
    output: PathBuf,
    snapshot: Option<PathBuf>,
) -> anyhow::Result<()> {
    config.outlets.sink = OutletSink::Jsonl;
    config.outlets.output_dir = output.clone();
    match snapshot {
        Some(path) => {
            config.overlay.enabled = true;
            config.overlay.display = DisplayKind::Snapshot;
            config.overlay.snapshot_path = path;
        }
        None => config.overlay.display = DisplayKind::None,
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    println!(
        "Simulating {frames} {} frames at {}x{}",
        scenario.name(),
        config.image.width,
        config.image.height
    );
    let messages = synthesize(&config, scenario, frames)?;

    let scene = InMemoryScene::new();
    scene.create(config.detection.marker_name.clone(), Vec3::ZERO);

    let session = EngineSession::from_config(
        &config,
        Box::new(ScriptedSource::new(messages)),
        Box::new(scene),
    )?;

    let cancel = CancellationToken::new();
    cancel.install_ctrlc_handler()?;
    let stats = session.run(&cancel)?;

    super::print_stats(&stats);
    println!();
    println!("Events detected:");
    for channel in OutputChannel::ALL {
        let path = output.join(format!("{}.jsonl", channel.stream_name()));
        let (events, samples) = count_events(&path)?;
        println!("  {:<18} {events}/{samples}", channel.stream_name());
    }
    println!("\nStreams written to {}", output.display());
    Ok(())
}

/// Build the full message sequence for a scenario.
fn synthesize(
    config: &AppConfig,
    scenario: Scenario,
    frames: usize,
) -> anyhow::Result<Vec<MultipartMessage>> {
    let (width, height) = (config.image.width, config.image.height);
    let codec = GazeCodec::new(config.transport.gaze_layout);
    let eye_rx = (config.detection.patch.width / 2).max(1) as i32;
    let eye_ry = (config.detection.patch.height / 4).max(1) as i32;

    (0..frames)
        .map(|frame| -> anyhow::Result<MultipartMessage> {
            let (px, py) = scenario.gaze_position(frame, width, height);
            let shade = scenario.eye_shade(frame);

            let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
            draw_filled_ellipse_mut(
                &mut image,
                (px as i32, py as i32),
                eye_rx,
                eye_ry,
                Rgb([shade, shade, shade]),
            );

            // Raw gaze has its vertical axis pointing up.
            let raw_x = i16::try_from(px).context("gaze x exceeds 16 bits")?;
            let raw_y = i16::try_from(height - py).context("gaze y exceeds 16 bits")?;

            let metadata = serde_json::to_vec(&serde_json::json!({
                "frame": frame,
                "scenario": scenario.name(),
            }))?;
            let png = encode_png(&image).context("failed to encode synthetic frame")?;

            Ok(MultipartMessage::frame(
                &config.transport.topic,
                metadata,
                png,
                codec.encode(RawGaze::new(raw_x, raw_y)),
            ))
        })
        .collect()
}

/// Count non-sentinel samples in a JSONL stream file.
fn count_events(path: &Path) -> anyhow::Result<(usize, usize)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut events = 0;
    let mut samples = 0;
    for line in content.lines().filter(|l| !l.starts_with('#')) {
        let sample: serde_json::Value = serde_json::from_str(line)?;
        let is_event = sample["v"]
            .as_array()
            .map(|v| v.iter().any(|x| x.as_f64() != Some(f64::from(NO_EVENT))))
            .unwrap_or(false);
        samples += 1;
        if is_event {
            events += 1;
        }
    }
    Ok((events, samples))
}
