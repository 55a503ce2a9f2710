//! Scan command - recognize IBANs in a single image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ibanscan_core::{IbanRecognizer, RecognitionOutcome, Rotation};

use super::extract::{OutputFormat, format_ibans};
use super::{RecognizerArgs, load_config, load_engine};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Image file (PNG, JPEG, TIFF, BMP, ...)
    #[arg(required = true)]
    image: PathBuf,

    /// Clockwise rotation applied before recognition (0, 90, 180 or 270)
    #[arg(short, long, default_value_t = 0)]
    rotation: u32,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    recognizer: RecognizerArgs,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }
    let rotation = Rotation::from_degrees(args.rotation)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    pb.set_message("Loading models...");
    let engine = load_engine(&config, args.model_dir.as_ref())?;
    let recognizer = IbanRecognizer::from_config(engine, &args.recognizer.apply(&config.recognizer))?;

    pb.set_message("Loading image...");
    info!("Scanning {}", args.image.display());
    let image = image::open(&args.image)?;
    let (width, height) = image.dimensions();
    debug!("Image size: {}x{}", width, height);

    pb.set_message("Recognizing...");
    let outcome = recognizer.process_image(image, width, height, rotation)?.await;
    recognizer.close();
    pb.finish_and_clear();

    let ibans = match outcome {
        RecognitionOutcome::Ibans(ibans) => ibans,
        RecognitionOutcome::Cancelled => {
            anyhow::bail!("Text recognition failed for {}", args.image.display())
        }
    };

    if ibans.is_empty() {
        eprintln!("{} No IBAN found", style("ℹ").blue());
    }
    print!("{}", format_ibans(&ibans, args.format)?);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
