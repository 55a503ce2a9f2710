//! Watch command - feed a sequence of images through the result filter.
//!
//! Mirrors a camera session: frames are recognized in order and only
//! changes in the recognized IBAN list are reported.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Args;
use console::style;
use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use ibanscan_core::{IbanRecognizer, RecognizerFilter, Rotation};

use super::{RecognizerArgs, load_config, load_engine};

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Glob pattern for frame images (e.g., "frames/*.png"), processed in sorted order
    #[arg(required = true)]
    pattern: String,

    /// Clockwise rotation applied to every frame (0, 90, 180 or 270)
    #[arg(short, long, default_value_t = 0)]
    rotation: u32,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Write a CSV summary of the delivered lists
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    recognizer: RecognizerArgs,
}

pub async fn run(args: WatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let rotation = Rotation::from_degrees(args.rotation)?;

    let mut files: Vec<PathBuf> = glob::glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No files found matching pattern: {}", args.pattern);
    }
    debug!("Found {} frame(s)", files.len());

    let engine = load_engine(&config, args.model_dir.as_ref())?;
    let recognizer = IbanRecognizer::from_config(engine, &args.recognizer.apply(&config.recognizer))?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames")?
            .progress_chars("=>-"),
    );

    let deliveries: Arc<Mutex<Vec<Vec<String>>>> = Arc::default();
    let filter = {
        let pb = pb.clone();
        let deliveries = Arc::clone(&deliveries);
        RecognizerFilter::new(recognizer, move |ibans: Vec<String>| {
            if ibans.is_empty() {
                pb.println(format!("{} No IBAN", style("-").dim()));
            } else {
                pb.println(format!("{} {}", style("✓").green(), ibans.join(", ")));
            }
            if let Ok(mut deliveries) = deliveries.lock() {
                deliveries.push(ibans);
            }
        })
    };

    for path in &files {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                pb.inc(1);
                continue;
            }
        };
        let (width, height) = image.dimensions();

        let progress = pb.clone();
        filter
            .process_image(image, width, height, rotation, move || progress.inc(1))?
            .await;
    }

    filter.finish().await;
    pb.finish_and_clear();

    let deliveries = deliveries
        .lock()
        .map_err(|_| anyhow::anyhow!("Result listener panicked"))?;

    println!(
        "{} {} frame(s), {} change(s) reported",
        style("ℹ").blue(),
        files.len(),
        deliveries.len()
    );

    if let Some(summary_path) = &args.summary {
        let mut wtr = csv::Writer::from_path(summary_path)?;
        wtr.write_record(["delivery", "count", "ibans"])?;
        for (index, ibans) in deliveries.iter().enumerate() {
            wtr.write_record([
                (index + 1).to_string(),
                ibans.len().to_string(),
                ibans.join(";"),
            ])?;
        }
        wtr.flush()?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    Ok(())
}
