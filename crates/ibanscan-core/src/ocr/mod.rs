//! Text recognition collaborator used by the IBAN recognizer.
//!
//! The recognizer only needs text back from a frame. Anything that can turn
//! a frame into text implements [`TextRecognitionEngine`]; the native build
//! ships [`PureOcrEngine`] on top of `pure-onnx-ocr`.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::error::{OcrError, ScanError};

/// Clockwise rotation needed to bring a frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation given in degrees (0, 90, 180 or 270).
    pub fn from_degrees(degrees: u32) -> Result<Self, ScanError> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(ScanError::InvalidArgument(format!(
                "rotation must be 0, 90, 180 or 270 degrees, got {}",
                other
            ))),
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotate `image` upright.
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::Deg0 => image,
            Rotation::Deg90 => image.rotate90(),
            Rotation::Deg180 => image.rotate180(),
            Rotation::Deg270 => image.rotate270(),
        }
    }
}

/// Pixel data of a frame.
#[derive(Debug, Clone)]
pub enum FrameSource {
    /// A decoded image.
    Image(DynamicImage),
    /// Raw bytes: either an encoded image (PNG, JPEG, ...) or a camera buffer
    /// whose first `width * height` bytes are the luma plane (NV21, YUV_420_888
    /// or plain 8-bit gray).
    Bytes(Vec<u8>),
}

/// One frame handed to a text recognition engine.
#[derive(Debug, Clone)]
pub struct Frame {
    pub source: FrameSource,
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
}

impl Frame {
    /// Decode the frame and rotate it upright.
    pub fn into_image(self) -> Result<DynamicImage, OcrError> {
        let image = match self.source {
            FrameSource::Image(image) => image,
            FrameSource::Bytes(bytes) => decode_bytes(bytes, self.width, self.height)?,
        };
        Ok(self.rotation.apply(image))
    }
}

fn decode_bytes(bytes: Vec<u8>, width: u32, height: u32) -> Result<DynamicImage, OcrError> {
    if image::guess_format(&bytes).is_ok() {
        return image::load_from_memory(&bytes)
            .map_err(|e| OcrError::InvalidImage(e.to_string()));
    }

    let luma_len = width as usize * height as usize;
    if bytes.len() < luma_len {
        return Err(OcrError::InvalidImage(format!(
            "{} bytes is less than a {}x{} luma plane",
            bytes.len(),
            width,
            height
        )));
    }

    let mut luma = bytes;
    luma.truncate(luma_len);
    GrayImage::from_raw(width, height, luma)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| OcrError::InvalidImage("luma plane size mismatch".to_string()))
}

/// What a text recognition engine produced for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// Recognized text, possibly empty.
    Recognized(String),
    /// Recognition was cancelled; there is no text.
    Cancelled,
}

/// Engine turning frames into text.
#[async_trait]
pub trait TextRecognitionEngine: Send + Sync {
    /// Recognize the text in a frame.
    async fn recognize(&self, frame: Frame) -> TextOutcome;

    /// Release the engine's resources. Called once by the owning recognizer.
    fn close(&self) {}
}

/// A recognized text line with its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined in reading order).
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Sort boxes by reading order (top-to-bottom, left-to-right) and rebuild
    /// the text, joining boxes with `separator`.
    pub fn sort_by_reading_order(&mut self, separator: &str) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Group by approximate vertical position (within 20 pixels)
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        self.text = self
            .boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(separator);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted engine for recognizer and filter tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Replays a fixed sequence of outcomes, then recognizes empty text.
    pub struct ScriptedEngine {
        outcomes: Mutex<VecDeque<TextOutcome>>,
        pub calls: Arc<AtomicUsize>,
        pub closed: Arc<AtomicBool>,
    }

    impl ScriptedEngine {
        pub fn new(outcomes: impl IntoIterator<Item = TextOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                calls: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
            Self::new(texts.into_iter().map(|t| TextOutcome::Recognized(t.to_string())))
        }
    }

    #[async_trait]
    impl TextRecognitionEngine for ScriptedEngine {
        async fn recognize(&self, _frame: Frame) -> TextOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| TextOutcome::Recognized(String::new()))
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }
}
