//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{Frame, OcrResult, TextBox, TextOutcome, TextRecognitionEngine};

type SharedEngine = Arc<Mutex<Option<pure_onnx_ocr::engine::OcrEngine>>>;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    /// `None` once the engine has been closed.
    engine: SharedEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `models`.
    pub fn from_config(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = models.model_path(&models.detection_model);
        let rec_path = models.model_path(&models.recognition_model);
        let dict_path = models.model_path(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        Ok(Self {
            engine: Arc::new(Mutex::new(Some(engine))),
            config,
        })
    }

    /// Create an engine from a model directory using the default file names.
    pub fn from_dir(model_dir: &Path, config: OcrConfig) -> Result<Self, OcrError> {
        let models = ModelConfig {
            model_dir: model_dir.to_path_buf(),
            ..ModelConfig::default()
        };
        Self::from_config(&models, config)
    }

    /// Process an image and extract text with bounding boxes.
    ///
    /// Blocks for the whole inference; async callers go through
    /// [`TextRecognitionEngine::recognize`], which runs it on the blocking pool.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        run_ocr(&self.engine, &self.config, image)
    }
}

fn run_ocr(
    engine: &SharedEngine,
    config: &OcrConfig,
    image: &DynamicImage,
) -> Result<OcrResult, OcrError> {
    let start = Instant::now();
    let (width, height) = image.dimensions();

    debug!("Processing image: {}x{}", width, height);

    let guard = engine
        .lock()
        .map_err(|_| OcrError::Recognition("engine lock poisoned".to_string()))?;
    let engine = guard
        .as_ref()
        .ok_or_else(|| OcrError::Recognition("engine is closed".to_string()))?;

    let results = engine
        .run_from_image(image)
        .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

    debug!("pure-onnx-ocr returned {} text regions", results.len());

    let boxes = results
        .iter()
        .map(|r| TextBox {
            bbox: polygon_to_bbox(&r.bounding_box),
            text: if config.keep_unknown {
                r.text.clone()
            } else {
                r.text.replace("[UNK]", " ")
            },
            confidence: r.confidence,
        })
        .collect();

    let mut result = OcrResult {
        boxes,
        text: String::new(),
        processing_time_ms: 0,
        image_size: (width, height),
    };
    result.sort_by_reading_order(&config.join_separator);
    result.processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "OCR complete: {} text boxes in {}ms",
        result.boxes.len(),
        result.processing_time_ms
    );

    Ok(result)
}

#[async_trait]
impl TextRecognitionEngine for PureOcrEngine {
    /// Decodes and runs inference on the blocking thread pool. Failures are
    /// logged and reported as a cancelled frame; the caller only
    /// distinguishes text from no text.
    async fn recognize(&self, frame: Frame) -> TextOutcome {
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();

        let task = tokio::task::spawn_blocking(move || -> Result<String, OcrError> {
            let image = frame.into_image()?;
            Ok(run_ocr(&engine, &config, &image)?.text)
        });

        match task.await {
            Ok(Ok(text)) => TextOutcome::Recognized(text),
            Ok(Err(e)) => {
                warn!("Text recognition failed: {}", e);
                TextOutcome::Cancelled
            }
            Err(e) => {
                warn!("Text recognition task failed: {}", e);
                TextOutcome::Cancelled
            }
        }
    }

    fn close(&self) {
        match self.engine.lock() {
            Ok(mut engine) => {
                if engine.take().is_some() {
                    debug!("Closed pure-onnx-ocr engine");
                }
            }
            Err(_) => warn!("Could not close OCR engine: lock poisoned"),
        }
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{FrameSource, Rotation};

    fn closed_engine() -> PureOcrEngine {
        PureOcrEngine {
            engine: Arc::new(Mutex::new(None)),
            config: OcrConfig::default(),
        }
    }

    fn frame() -> Frame {
        Frame {
            source: FrameSource::Image(DynamicImage::new_luma8(8, 8)),
            width: 8,
            height: 8,
            rotation: Rotation::Deg0,
        }
    }

    #[test]
    fn test_process_after_close_fails() {
        let engine = closed_engine();
        assert!(matches!(
            engine.process(&DynamicImage::new_luma8(8, 8)),
            Err(OcrError::Recognition(_))
        ));
    }

    #[tokio::test]
    async fn test_recognize_after_close_is_cancelled() {
        let engine = closed_engine();
        assert_eq!(engine.recognize(frame()).await, TextOutcome::Cancelled);
    }

    #[test]
    fn test_missing_models_rejected() {
        let dir = std::env::temp_dir().join("ibanscan-no-models-here");
        let result = PureOcrEngine::from_dir(&dir, OcrConfig::default());
        assert!(matches!(result, Err(OcrError::ModelLoad(_))));
    }
}
