// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "filmcam")]
#[command(about = "Film look still capture")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a photo from an image file and save it with the film look
    Process {
        /// Image file used as the capture source
        input: PathBuf,

        /// Film style (normal, kodak, fuji)
        #[arg(short, long)]
        style: Option<String>,

        /// Enable the light leak with the given intensity (0.0 - 1.0)
        #[arg(long, value_name = "INTENSITY")]
        light_leak: Option<f32>,

        /// Stamp the capture date in the lower right corner
        #[arg(long)]
        date_stamp: bool,

        /// Manual exposure ISO (requires --shutter)
        #[arg(long)]
        iso: Option<f32>,

        /// Manual exposure shutter duration in seconds (requires --iso)
        #[arg(long)]
        shutter: Option<f64>,

        /// Output directory (default: ~/Pictures/filmcam)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (jpeg, png)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List film styles
    Styles,

    /// Show the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=filmcam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            style,
            light_leak,
            date_stamp,
            iso,
            shutter,
            output,
            format,
        } => cli::process(cli::ProcessOptions {
            input,
            style,
            light_leak,
            date_stamp,
            iso,
            shutter,
            output,
            format,
        }),
        Commands::Styles => cli::list_styles(),
        Commands::Config => cli::show_config(),
    }
}
