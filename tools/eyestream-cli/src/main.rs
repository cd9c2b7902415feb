//! Eyestream CLI — Command-line interface for the eye-event engine.
//!
//! Usage:
//!   eyestream run [OPTIONS]         Classify frames from a ZMQ publisher
//!   eyestream simulate [OPTIONS]    Run the engine on synthetic frames
//!   eyestream config show|init      Inspect or create the config file
//!   eyestream check                 Validate config and list output streams

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyestream_common::config::{AppConfig, DisplayKind};

mod commands;

use commands::simulate::Scenario;

#[derive(Parser)]
#[command(
    name = "eyestream",
    about = "Real-time fixation, saccade, and blink detection",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to a frame publisher and classify until interrupted
    Run {
        /// Publisher address
        #[arg(long)]
        address: Option<String>,

        /// Subscription topic
        #[arg(long)]
        topic: Option<String>,

        /// Directory for JSONL stream files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Displacement and stddev threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Sliding window length in frames
        #[arg(long)]
        history_size: Option<usize>,

        /// Overlay display: none|snapshot|window
        #[arg(long)]
        display: Option<DisplayKind>,
    },

    /// Feed synthetic frames through the engine
    Simulate {
        /// Number of frames to generate
        #[arg(short, long, default_value = "120")]
        frames: usize,

        /// Gaze behaviour to synthesize
        #[arg(short, long, value_enum, default_value = "fixation")]
        scenario: Scenario,

        /// Directory for JSONL stream files
        #[arg(short, long, default_value = "eyestream-sim")]
        output: PathBuf,

        /// Displacement and stddev threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Sliding window length in frames
        #[arg(long)]
        history_size: Option<usize>,

        /// Write the last annotated frame to this PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Validate configuration and list the declared output streams
    Check,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    eyestream_common::logging::init_logging(&logging);
    tracing::debug!(path = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Run {
            address,
            topic,
            output,
            threshold,
            history_size,
            display,
        } => {
            let mut config = config;
            if let Some(address) = address {
                config.transport.address = address;
            }
            if let Some(topic) = topic {
                config.transport.topic = topic;
            }
            if let Some(output) = output {
                config.outlets.output_dir = output;
            }
            if let Some(display) = display {
                config.overlay.display = display;
            }
            commands::apply_detection_overrides(&mut config, threshold, history_size);
            commands::run::run(config)
        }
        Commands::Simulate {
            frames,
            scenario,
            output,
            threshold,
            history_size,
            snapshot,
        } => {
            let mut config = config;
            commands::apply_detection_overrides(&mut config, threshold, history_size);
            commands::simulate::run(config, frames, scenario, output, snapshot)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, cli.config.as_deref()),
            ConfigAction::Init { force } => commands::config::init(cli.config.as_deref(), force),
        },
        Commands::Check => commands::check::run(&config),
    }
}
