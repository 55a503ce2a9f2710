//! Core library for IBAN scanning.
//!
//! This crate provides:
//! - IBAN candidate matching in recognized text, tolerant of OCR noise
//! - IBAN validation (country length table and ISO 7064 mod-97-10)
//! - A recognizer driving a text recognition engine, with OCR confusion
//!   correction and preferred-country prioritization
//! - A filter streaming deduplicated, display-formatted results to a listener
//! - A pure Rust OCR engine (`native` feature)

pub mod error;
pub mod iban;
pub mod models;
pub mod ocr;

pub use error::{IbanError, OcrError, Result, ScanError};
pub use iban::{
    format_iban, is_valid_iban, validate_iban, FieldExtractor, Iban, IbanExtractor,
    IbanRecognizer, IbansListener, ProcessingListener, RecognitionOutcome, RecognizerFilter,
};
pub use models::config::ScanConfig;
pub use ocr::{Frame, FrameSource, Rotation, TextOutcome, TextRecognitionEngine};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
