//! Validate configuration and list output streams.

use eyestream_common::config::{config_file_path, AppConfig, DisplayKind, OutletSink};
use eyestream_event_model::OutputChannel;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Eyestream Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[--] Config file: {} (using defaults)", path.display());
    }

    match config.validate() {
        Ok(()) => println!("[OK] Configuration is valid"),
        Err(e) => {
            println!("[FAIL] {e}");
            anyhow::bail!("configuration is invalid");
        }
    }

    let image = &config.image;
    let (ppd_x, ppd_y) = image.pixels_per_degree();
    println!(
        "     Frames: {}x{}x{}, {:.2} x {:.2} px/deg",
        image.width, image.height, image.channels, ppd_x, ppd_y
    );
    println!(
        "     Window: {} frames, threshold {}, blink patch {}x{}",
        config.detection.history_size,
        config.detection.threshold,
        config.detection.patch.width,
        config.detection.patch.height
    );

    println!();
    println!("Output streams ({:?} sink):", config.outlets.sink);
    for channel in OutputChannel::ALL {
        let info = channel.stream_info(config.outlets.nominal_rate_hz);
        println!(
            "     {:<18} {} ch  {:?}  {} Hz",
            info.name, info.channel_count, info.format, info.nominal_rate_hz
        );
    }

    println!();
    report_feature("ZMQ transport", cfg!(feature = "zmq"), true);
    report_feature(
        "ZMQ outlets",
        cfg!(feature = "zmq"),
        config.outlets.sink == OutletSink::Zmq,
    );
    report_feature(
        "Overlay window",
        cfg!(feature = "window"),
        config.overlay.display == DisplayKind::Window,
    );

    Ok(())
}

fn report_feature(name: &str, built: bool, needed: bool) {
    match (built, needed) {
        (true, _) => println!("[OK] {name}: available"),
        (false, true) => println!("[WARN] {name}: not built in but required by config"),
        (false, false) => println!("[--] {name}: not built in"),
    }
}
