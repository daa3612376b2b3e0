use anyhow::{Context, Result};
use blush::setup::{initialize, SetupConfig};
use blush::transfer::DEFAULT_DAMPING;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source face image
    source: PathBuf,

    /// Reference makeup image
    reference: PathBuf,

    /// Makeup transfer intensity, between 0.1 and 2.0
    #[arg(short, long, default_value_t = 1.0)]
    intensity: f32,

    /// Output image path
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Directory holding the model weight artifacts
    #[arg(long, default_value = "models/stablemakeup")]
    weights_dir: PathBuf,

    /// Staging directory to copy missing weight artifacts from.
    /// If not provided, runs without the model backend unless weights
    /// already exist
    #[arg(long)]
    weights_source: Option<PathBuf>,

    /// Seconds to wait for the model backend before falling back
    #[arg(long, default_value_t = 30)]
    model_timeout_secs: u64,

    /// Damping applied by the statistical fallback
    #[arg(long, default_value_t = DEFAULT_DAMPING)]
    damping: f32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Blush starting");
    tracing::info!("Source: {}", args.source.display());
    tracing::info!("Reference: {}", args.reference.display());
    tracing::info!("Intensity: {}", args.intensity);

    let config = SetupConfig {
        weights_dir: args.weights_dir,
        weights_source: args.weights_source,
        model_timeout: Duration::from_secs(args.model_timeout_secs),
        damping: args.damping,
    };

    let setup_start = Instant::now();
    let pipeline = initialize(&config);
    tracing::info!(
        "Setup finished in {:.1}ms",
        setup_start.elapsed().as_secs_f64() * 1000.0
    );

    let run_start = Instant::now();
    let result = pipeline
        .run_files(&args.source, &args.reference, args.intensity)
        .context("Transfer request rejected")?;
    tracing::info!(
        "Transfer finished in {:.1}ms using the {} backend",
        run_start.elapsed().as_secs_f64() * 1000.0,
        result.backend_used
    );

    result
        .output
        .save(&args.output)
        .with_context(|| format!("Failed to write output image to {}", args.output.display()))?;

    println!("{}", args.output.display());
    Ok(())
}
