//! Classify frames from a live ZMQ publisher.

use eyestream_common::config::AppConfig;

#[cfg(feature = "zmq")]
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    use eyestream_event_model::Vec3;
    use eyestream_ingest::ZmqFrameSource;
    use eyestream_runtime::{CancellationToken, EngineSession, InMemoryScene};

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let source = ZmqFrameSource::connect(&config.transport)?;

    let scene = InMemoryScene::new();
    scene.create(config.detection.marker_name.clone(), Vec3::ZERO);

    let session = EngineSession::from_config(&config, Box::new(source), Box::new(scene))?;

    let cancel = CancellationToken::new();
    cancel.install_ctrlc_handler()?;

    println!(
        "Listening on {} (topic {:?}). Press Ctrl+C to stop.",
        config.transport.address, config.transport.topic
    );
    let stats = session.run(&cancel)?;
    super::print_stats(&stats);
    Ok(())
}

#[cfg(not(feature = "zmq"))]
pub fn run(_config: AppConfig) -> anyhow::Result<()> {
    Err(eyestream_common::error::EyestreamError::unsupported(
        "`eyestream run` needs the ZMQ transport; rebuild with `--features zmq`",
    )
    .into())
}
