//! `depthgen` CLI - generate resized photo and depth-map variants.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use depthgen::{Config, Device, Pipeline};

/// Convert a directory of photos into resized photo and depth-map WEBP variants.
#[derive(Parser, Debug)]
#[command(name = "depthgen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the input photos.
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Output directory. Defaults to INPUT_DIR/output.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Use a local ONNX depth model instead of the cached download.
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Compute device: auto, cpu, cuda or coreml.
    #[arg(long, default_value = "auto", value_name = "DEVICE")]
    device: Device,

    /// WEBP quality for resized photos (1-100).
    #[arg(long, default_value = "85", value_name = "INT")]
    photo_quality: u8,

    /// WEBP quality for depth maps (1-100).
    #[arg(long, default_value = "80", value_name = "INT")]
    depth_quality: u8,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("depthgen={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", args.input_dir.display());
    }

    let config = Config {
        output_dir: args.output_dir.clone(),
        photo_quality: args.photo_quality,
        depth_quality: args.depth_quality,
        device: args.device,
        model_path: args.model.clone(),
    };
    config.validate().context("Invalid configuration")?;

    // Skip model loading entirely when there is nothing to process
    let images = depthgen::image::discover_images(&args.input_dir)
        .context("Failed to list input directory")?;
    if images.is_empty() {
        std::fs::create_dir_all(config.output_dir_for(&args.input_dir))
            .context("Failed to create output directory")?;
        println!("No images found in {}", args.input_dir.display());
        return Ok(());
    }

    let mut pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let summary = pipeline
        .process_directory(&args.input_dir)
        .context("Failed to process images")?;

    println!(
        "Processed {} image(s), wrote {} file(s) to {}",
        summary.images,
        summary.outputs.len(),
        summary.output_dir.display()
    );
    println!("Done.");

    Ok(())
}
