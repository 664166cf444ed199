//! coverlift - upscale and restore product cover images
//!
//! Thin front end over the enhancement worker: each processing command
//! submits one job, renders its progress and writes the PNG result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "coverlift")]
#[command(author, version, about = "Upscale and restore product cover images")]
#[command(long_about = "
Sharpens, denoises and upscales raster images off the main thread.
Output is always lossless PNG.

Examples:
  coverlift info cover.jpg
  coverlift upscale cover.jpg -o cover@2x.png
  coverlift upscale cover.jpg -o big.png --scale 3 --algorithm lanczos --denoise
  coverlift restore scan.png -o crisp.png --sharpness 1.5
  coverlift run cover.jpg -o out.png --options job.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (also enables debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Worker config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show format and dimensions, and whether the size gate admits the image
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Denoise, resample, sharpen and tone an image
    #[command(visible_alias = "up")]
    Upscale(UpscaleArgs),

    /// Sharpen an image at its native resolution
    Restore(RestoreArgs),

    /// Process with options read from a JSON file
    Run(RunArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

/// Sharpening method.
#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// 3x3 standard kernel
    Bicubic,
    /// 3x3 strong kernel
    Lanczos,
    /// Gaussian unsharp mask
    Unsharp,
}

/// Resampling filter.
#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

#[derive(Args)]
struct UpscaleArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Scale factor (>= 1)
    #[arg(short, long, default_value = "2")]
    scale: f32,

    /// Sharpening strength
    #[arg(long, default_value = "1.0")]
    sharpness: f32,

    /// Sharpening method
    #[arg(short, long, value_enum, default_value = "unsharp")]
    algorithm: AlgorithmArg,

    /// Resampling filter (overrides the config)
    #[arg(long, value_enum)]
    filter: Option<FilterArg>,

    /// Denoise before resampling
    #[arg(long)]
    denoise: bool,

    /// Denoise strength in [0, 1] (default 0.3)
    #[arg(long, requires = "denoise")]
    denoise_strength: Option<f32>,

    /// Apply contrast after sharpening
    #[arg(long)]
    contrast: bool,

    /// Contrast amount (default 0.1)
    #[arg(long, requires = "contrast", allow_hyphen_values = true)]
    contrast_amount: Option<f32>,

    /// Apply vibrance after sharpening
    #[arg(long)]
    vibrance: bool,

    /// Vibrance amount (default 0.2)
    #[arg(long, requires = "vibrance", allow_hyphen_values = true)]
    vibrance_amount: Option<f32>,
}

#[derive(Args)]
struct RestoreArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Sharpening strength
    #[arg(long, default_value = "1.0")]
    sharpness: f32,

    /// Sharpening method
    #[arg(short, long, value_enum, default_value = "unsharp")]
    algorithm: AlgorithmArg,
}

#[derive(Args)]
struct RunArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Processing options (JSON, camelCase)
    #[arg(long)]
    options: PathBuf,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args, &config, cli.verbose),
        Commands::Upscale(args) => commands::process::upscale(args, config, cli.verbose),
        Commands::Restore(args) => commands::process::restore(args, config, cli.verbose),
        Commands::Run(args) => commands::process::run(args, config, cli.verbose),
    }
}
