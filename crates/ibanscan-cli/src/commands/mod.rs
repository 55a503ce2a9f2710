//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod scan;
pub mod validate;
pub mod watch;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use ibanscan_core::PureOcrEngine;
use ibanscan_core::models::config::{RecognizerConfig, ScanConfig};

/// Recognizer options shared by the extracting commands.
#[derive(Args, Clone, Debug)]
pub struct RecognizerArgs {
    /// Regex selecting preferred IBANs (default from config: German IBANs)
    #[arg(long)]
    preferred: Option<String>,

    /// Do not retry with OCR letter/digit confusions corrected
    #[arg(long)]
    no_correction: bool,
}

impl RecognizerArgs {
    /// Apply command-line overrides on top of the configured values.
    pub fn apply(&self, config: &RecognizerConfig) -> RecognizerConfig {
        let mut config = config.clone();
        if let Some(pattern) = &self.preferred {
            config.preferred_pattern = pattern.clone();
        }
        if self.no_correction {
            config.ocr_correction = false;
        }
        config
    }
}

/// Load the configuration from `config_path`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = config_path {
        return Ok(ScanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(ScanConfig::from_file(&default_path)?)
    } else {
        Ok(ScanConfig::default())
    }
}

/// Load the OCR engine, optionally from a model directory other than the configured one.
pub fn load_engine(config: &ScanConfig, model_dir: Option<&PathBuf>) -> anyhow::Result<PureOcrEngine> {
    let mut models = config.models.clone();
    if let Some(dir) = model_dir {
        models.model_dir = dir.clone();
    }

    PureOcrEngine::from_config(&models, config.ocr.clone()).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models: {}\n\n\
             Place {}, {} and {} in {} or pass --model-dir.",
            e,
            models.detection_model,
            models.recognition_model,
            models.dictionary,
            models.model_dir.display()
        )
    })
}
