use eyestream_common::config::{DetectionConfig, ImageConfig};
use eyestream_detection::{EyeEventEngine, Verdict};
use eyestream_event_model::{Frame, RawGaze, Vec3};
use image::{Rgb, RgbImage};

fn frame(sequence: u64, x: i16, y: i16) -> Frame {
    Frame::new(
        sequence,
        RgbImage::from_pixel(400, 400, Rgb([60, 60, 60])),
        RawGaze::new(x, y),
    )
}

fn engine_with_threshold(threshold: f64) -> EyeEventEngine {
    let detection = DetectionConfig {
        threshold,
        ..Default::default()
    };
    EyeEventEngine::new(&detection, &ImageConfig::default())
}

#[test]
fn event_channels_are_sentinel_until_window_fills() {
    let mut engine = engine_with_threshold(0.7);
    let history_size = DetectionConfig::default().history_size;

    for seq in 0..(history_size as u64 - 1) {
        let x = (seq as i16) * 37 % 400;
        let detection = engine.process(&frame(seq, x, 50), Vec3::new(1.0, 2.0, 3.0));
        let samples = detection.samples();

        assert!(samples.fixation.is_sentinel(), "frame {seq}");
        assert!(samples.saccade.is_sentinel(), "frame {seq}");
        assert!(samples.blink.is_sentinel(), "frame {seq}");
        assert!(!samples.gaze.is_sentinel(), "frame {seq}");
    }
}

#[test]
fn reference_scenario_fixation_without_saccade() {
    let mut engine = engine_with_threshold(0.7);
    let marker = Vec3::new(100.0, 300.0, 0.0);

    let detections: Vec<_> = (0..10)
        .map(|seq| engine.process(&frame(seq, 100, 100), marker))
        .collect();

    for detection in &detections {
        assert_eq!(detection.gaze.y, 300.0);
    }

    let tenth = detections.last().unwrap();
    assert!(tenth.fixation.fired());
    assert!(!tenth.saccade.fired());
    assert_eq!(tenth.samples().fixation.values(), &[100.0, 300.0, 0.0]);
}

#[test]
fn one_pixel_step_fires_both_displacement_events() {
    // Nine samples at the same spot then a one pixel step: the
    // oldest-anchored metric is 1, the newest-anchored metric is 3.
    let mut engine = engine_with_threshold(2.0);
    let marker = Vec3::new(7.0, 8.0, 0.0);

    let mut last = None;
    for seq in 0..10 {
        let x = if seq == 9 { 101 } else { 100 };
        last = Some(engine.process(&frame(seq, x, 100), marker));
    }
    let detection = last.unwrap();

    assert_eq!(detection.fixation, Verdict::Fired { metric: 1.0 });
    assert_eq!(detection.saccade, Verdict::Fired { metric: 3.0 });

    let samples = detection.samples();
    assert_eq!(samples.fixation.values(), &[7.0, 8.0, 0.0]);
    assert_eq!(samples.saccade.values(), &[7.0, 8.0, 0.0]);
}

#[test]
fn displacement_equal_to_threshold_fires_neither() {
    // Two-sample window, step of (3, 4): both metrics are exactly 5.
    let detection_config = DetectionConfig {
        threshold: 5.0,
        history_size: 2,
        ..Default::default()
    };
    let mut engine = EyeEventEngine::new(&detection_config, &ImageConfig::default());

    engine.process(&frame(0, 10, 10), Vec3::ZERO);
    let detection = engine.process(&frame(1, 13, 6), Vec3::ZERO);

    assert_eq!(detection.fixation, Verdict::Quiet { metric: 5.0 });
    assert_eq!(detection.saccade, Verdict::Quiet { metric: 5.0 });
}

#[test]
fn irregular_arrival_keeps_window_bounded() {
    let mut engine = engine_with_threshold(0.7);
    // Gaps in the sequence numbers simulate frames dropped upstream.
    for seq in [0u64, 1, 5, 6, 20, 21, 22, 40, 41, 42, 43, 90] {
        engine.process(&frame(seq, 200, 200), Vec3::ZERO);
        assert!(engine.gaze_history().len() <= 10);
    }
    assert!(engine.gaze_history().is_full());
}
