//! Configuration structures for the scanning pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Default preferred-country pattern: German IBANs.
pub const DEFAULT_PREFERRED_PATTERN: &str = r"^DE\d{18}$";

/// Main configuration for the ibanscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// IBAN recognizer configuration.
    pub recognizer: RecognizerConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// IBAN recognizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// IBANs matching this regex are returned instead of the others.
    pub preferred_pattern: String,

    /// Retry with OCR letter/digit confusions corrected when nothing validates.
    pub ocr_correction: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            preferred_pattern: DEFAULT_PREFERRED_PATTERN.to_string(),
            ocr_correction: true,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens in recognized text instead of replacing them with spaces.
    pub keep_unknown: bool,

    /// Separator placed between text boxes when joining them.
    pub join_separator: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unknown: false,
            join_separator: "\n".to_string(),
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Get full path to a file in the model directory.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.recognizer.preferred_pattern, r"^DE\d{18}$");
        assert!(config.recognizer.ocr_correction);
        assert_eq!(config.ocr.join_separator, "\n");
        assert_eq!(
            config.models.model_path(&config.models.detection_model),
            PathBuf::from("models").join("det.onnx")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"recognizer": {"preferred_pattern": "^AT"}}"#).unwrap();
        assert_eq!(config.recognizer.preferred_pattern, "^AT");
        assert!(config.recognizer.ocr_correction);
        assert_eq!(config.models.recognition_model, "latin_rec.onnx");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("ibanscan-config-{}.json", std::process::id()));
        let mut config = ScanConfig::default();
        config.recognizer.ocr_correction = false;
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert!(!loaded.recognizer.ocr_correction);
        std::fs::remove_file(&path).unwrap();
    }
}
