//! IBAN recognition from frames and recognized text.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use image::DynamicImage;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::FieldExtractor;
use super::correction::correct_ocr_confusions;
use super::patterns::find_candidates;
use super::validator::Iban;
use crate::error::{Result, ScanError};
use crate::models::config::{DEFAULT_PREFERRED_PATTERN, RecognizerConfig};
use crate::ocr::{Frame, FrameSource, Rotation, TextOutcome, TextRecognitionEngine};

lazy_static! {
    static ref DEFAULT_PREFERRED: Regex = Regex::new(DEFAULT_PREFERRED_PATTERN).unwrap();
}

/// Outcome of one recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Valid IBANs in compact form, preferred ones only if any were found.
    Ibans(Vec<String>),
    /// The text recognition engine cancelled the frame.
    Cancelled,
}

/// Pending recognition of one frame.
pub type RecognitionFuture = BoxFuture<'static, RecognitionOutcome>;

/// Text-level IBAN extraction: candidates, validation, OCR correction and
/// preferred-country prioritization.
#[derive(Debug, Clone)]
pub struct IbanExtractor {
    preferred: Regex,
    ocr_correction: bool,
}

impl IbanExtractor {
    /// Create an extractor preferring German IBANs, with OCR correction on.
    pub fn new() -> Self {
        Self {
            preferred: DEFAULT_PREFERRED.clone(),
            ocr_correction: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &RecognizerConfig) -> Result<Self> {
        Ok(Self::new()
            .with_preferred_pattern(&config.preferred_pattern)?
            .with_ocr_correction(config.ocr_correction))
    }

    /// Set the regex selecting preferred IBANs.
    pub fn with_preferred_pattern(mut self, pattern: &str) -> Result<Self> {
        self.preferred = Regex::new(pattern).map_err(|e| {
            ScanError::Config(format!("invalid preferred IBAN pattern {:?}: {}", pattern, e))
        })?;
        Ok(self)
    }

    /// Set whether OCR letter/digit confusions are corrected when nothing validates.
    pub fn with_ocr_correction(mut self, enabled: bool) -> Self {
        self.ocr_correction = enabled;
        self
    }

    pub fn preferred_pattern(&self) -> &str {
        self.preferred.as_str()
    }

    /// Extract valid IBANs from recognized text.
    ///
    /// Candidates are corrected for OCR confusions only when none of them
    /// validates as read. If any valid IBAN matches the preferred pattern,
    /// only those are returned.
    pub fn extract_ibans(&self, text: &str) -> Vec<String> {
        let candidates = unique(find_candidates(text).iter().map(|c| strip_whitespace(c)));
        trace!("IBAN candidates: {:?}", candidates);

        let mut valid = valid_ibans(candidates.iter().map(String::as_str));

        if valid.is_empty() && self.ocr_correction && !candidates.is_empty() {
            let corrected: Vec<String> = candidates
                .iter()
                .map(|c| correct_ocr_confusions(c))
                .collect();
            valid = valid_ibans(corrected.iter().map(String::as_str));
            if !valid.is_empty() {
                debug!("Recovered {} IBAN(s) after OCR correction", valid.len());
            }
        }

        let preferred: Vec<String> = valid
            .iter()
            .filter(|iban| self.preferred.is_match(iban))
            .cloned()
            .collect();

        debug!(
            "Found {} candidate(s), {} valid, {} preferred",
            candidates.len(),
            valid.len(),
            preferred.len()
        );

        if preferred.is_empty() { valid } else { preferred }
    }
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IbanExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.extract_ibans(text)
    }
}

/// Drop whitespace. Hyphens are left for the validator to reject.
fn strip_whitespace(candidate: &str) -> String {
    candidate.chars().filter(|c| !c.is_whitespace()).collect()
}

fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn valid_ibans<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    unique(candidates.into_iter().filter_map(|candidate| {
        match Iban::parse(candidate) {
            Ok(iban) => Some(iban.into_string()),
            Err(e) => {
                trace!("Rejected {:?}: {}", candidate, e);
                None
            }
        }
    }))
}

/// Recognizes IBANs in frames using a text recognition engine.
///
/// Holds no state between calls besides its configuration, so calls may run
/// concurrently.
pub struct IbanRecognizer<E: TextRecognitionEngine> {
    engine: Arc<E>,
    extractor: IbanExtractor,
}

impl<E: TextRecognitionEngine + 'static> IbanRecognizer<E> {
    /// Create a recognizer with the default extractor.
    pub fn new(engine: E) -> Self {
        Self::with_extractor(engine, IbanExtractor::new())
    }

    /// Create a recognizer with a custom extractor.
    pub fn with_extractor(engine: E, extractor: IbanExtractor) -> Self {
        Self {
            engine: Arc::new(engine),
            extractor,
        }
    }

    /// Create a recognizer from configuration.
    pub fn from_config(engine: E, config: &RecognizerConfig) -> Result<Self> {
        Ok(Self::with_extractor(engine, IbanExtractor::from_config(config)?))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn extractor(&self) -> &IbanExtractor {
        &self.extractor
    }

    /// Recognize IBANs in a decoded image.
    ///
    /// Fails immediately if `width` or `height` is zero; otherwise returns
    /// the pending recognition.
    pub fn process_image(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
        rotation: Rotation,
    ) -> Result<RecognitionFuture> {
        self.process_frame(Frame {
            source: FrameSource::Image(image),
            width,
            height,
            rotation,
        })
    }

    /// Recognize IBANs in a raw byte buffer. Same contract as [`Self::process_image`].
    pub fn process_byte_array(
        &self,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        rotation: Rotation,
    ) -> Result<RecognitionFuture> {
        self.process_frame(Frame {
            source: FrameSource::Bytes(bytes),
            width,
            height,
            rotation,
        })
    }

    /// Recognize IBANs in a frame.
    pub fn process_frame(&self, frame: Frame) -> Result<RecognitionFuture> {
        check_dimensions(frame.width, frame.height)?;

        let engine = Arc::clone(&self.engine);
        let extractor = self.extractor.clone();

        Ok(async move {
            match engine.recognize(frame).await {
                TextOutcome::Recognized(text) => {
                    RecognitionOutcome::Ibans(extractor.extract_ibans(&text))
                }
                TextOutcome::Cancelled => {
                    debug!("Text recognition cancelled");
                    RecognitionOutcome::Cancelled
                }
            }
        }
        .boxed())
    }

    /// Extract IBANs from already recognized text.
    pub fn extract_ibans(&self, text: &str) -> Vec<String> {
        self.extractor.extract_ibans(text)
    }

    /// Release the text recognition engine.
    pub fn close(self) {
        self.engine.close();
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidArgument(format!(
            "width and height must be greater than 0, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
