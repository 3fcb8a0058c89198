//! vPTZ CLI — drive the virtual pan-tilt-zoom controller offline.
//!
//! Usage:
//!   vptz replay <INPUT>     Run the controller over a detection stream
//!   vptz synth <OUTPUT>     Write a synthetic detection stream
//!   vptz config [--init]    Show (and optionally save) the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vptz_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "vptz",
    about = "Virtual pan-tilt-zoom: smooth subject-following crops from detections",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller over a JSONL detection stream
    Replay {
        /// Detection stream (JSONL)
        input: PathBuf,

        /// Where to write crop records (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source frame width (overrides stream header and config)
        #[arg(long)]
        width: Option<u32>,

        /// Source frame height (overrides stream header and config)
        #[arg(long)]
        height: Option<u32>,

        /// Flip detections horizontally (selfie view)
        #[arg(long)]
        mirror: bool,

        /// Ignore detections scoring below this
        #[arg(long)]
        min_confidence: Option<f64>,
    },

    /// Write a deterministic synthetic detection stream
    Synth {
        /// Output file (JSONL)
        output: PathBuf,

        /// Number of frames to generate
        #[arg(long, default_value = "300")]
        frames: u64,

        /// Source frame width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Source frame height
        #[arg(long, default_value = "480")]
        height: u32,

        /// Drop the subject every Nth frame (0 = never)
        #[arg(long, default_value = "10")]
        dropout: u64,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Also write it to the standard location
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    vptz_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Replay {
            input,
            output,
            width,
            height,
            mirror,
            min_confidence,
        } => commands::replay::run(
            &config,
            commands::replay::ReplayOptions {
                input,
                output,
                width,
                height,
                mirror,
                min_confidence,
            },
        ),
        Commands::Synth {
            output,
            frames,
            width,
            height,
            dropout,
        } => commands::synth::run(output, frames, width, height, dropout),
        Commands::Config { init } => commands::config::run(&config, init),
    }
}
