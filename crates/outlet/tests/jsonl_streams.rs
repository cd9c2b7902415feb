//! Publisher writing JSONL stream files.

use eyestream_common::config::{OutletConfig, OutletSink};
use eyestream_event_model::{EventSample, FrameSamples, GazeSample, OutputChannel, BLINK_FLAG};
use eyestream_outlet::Publisher;

fn read_samples(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn jsonl_publisher_writes_aligned_streams() {
    let dir = tempfile::tempdir().unwrap();
    let config = OutletConfig {
        sink: OutletSink::Jsonl,
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    {
        let mut publisher = Publisher::from_config(&config, "2026-01-01T00:00:00Z").unwrap();
        for i in 0..5 {
            let mut samples = FrameSamples::quiet(GazeSample::new(i as f64, 10.0));
            if i == 4 {
                samples.blink = EventSample::flag(BLINK_FLAG);
            }
            publisher.publish(&samples, i as f64 / 30.0).unwrap();
        }
        publisher.flush().unwrap();
    }

    for channel in OutputChannel::ALL {
        let path = dir.path().join(format!("{}.jsonl", channel.stream_name()));
        let samples = read_samples(&path);
        assert_eq!(samples.len(), 5, "{channel}");
        for sample in &samples {
            assert_eq!(
                sample["v"].as_array().unwrap().len(),
                channel.channel_count()
            );
        }
    }

    let blink = read_samples(&dir.path().join("BlinkDetection.jsonl"));
    assert_eq!(blink[3]["v"], serde_json::json!([-1.0]));
    assert_eq!(blink[4]["v"], serde_json::json!([1.0]));

    let gaze = read_samples(&dir.path().join("GazePosition.jsonl"));
    assert_eq!(gaze[2]["v"], serde_json::json!([2.0, 10.0, 0.0]));
}

#[test]
fn null_sink_counts_without_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = OutletConfig {
        sink: OutletSink::None,
        output_dir: dir.path().join("unused"),
        ..Default::default()
    };

    let mut publisher = Publisher::from_config(&config, "epoch").unwrap();
    publisher
        .publish(&FrameSamples::quiet(GazeSample::new(0.0, 0.0)), 0.0)
        .unwrap();

    assert_eq!(publisher.samples_published(), [1, 1, 1, 1]);
    assert!(!dir.path().join("unused").exists());
}
