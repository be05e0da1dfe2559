// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Timed burst capture and photo collages")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a burst against a still image standing in for the camera
    Burst {
        /// Image used as the frame source
        source: PathBuf,

        /// Number of shots
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Countdown before each shot in seconds (0, 3, 5 or 10)
        #[arg(short, long, default_value = "0")]
        timer: u32,

        /// Filter preset name or CSS filter text, e.g. "sepia" or "blur(2px) invert(100%)"
        #[arg(short, long, default_value = "none")]
        filter: String,

        /// Output directory (default: ~/Pictures/Photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also compose the burst into a collage
        #[arg(short, long)]
        mosaic: bool,
    },

    /// Compose existing photos into a collage
    Mosaic {
        /// Image files or directories
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file (default: ~/Pictures/Photobooth/collage_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for the tile height jitter
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List filter presets
    Filters,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Burst {
            source,
            count,
            timer,
            filter,
            output,
            mosaic,
        } => cli::run_burst(
            config,
            cli::BurstArgs {
                source,
                count,
                timer,
                filter,
                output,
                mosaic,
            },
        ),
        Commands::Mosaic {
            input,
            output,
            seed,
        } => cli::compose_mosaic(config, input, output, seed),
        Commands::Filters => cli::list_filters(),
    }
}
