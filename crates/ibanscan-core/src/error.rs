//! Error types for the ibanscan-core library.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the ibanscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A caller-supplied argument was rejected before any work started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// OCR engine error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the text recognition engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Reasons a string is not a valid IBAN.
///
/// These never escape the recognizer: they only decide whether a candidate
/// is kept.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IbanError {
    #[error("IBAN is empty")]
    Empty,

    #[error("IBAN contains characters other than A-Z and 0-9")]
    InvalidCharacters,

    #[error("IBAN must start with a 2-letter country code and 2 check digits")]
    InvalidFormat,

    #[error("unknown IBAN country code")]
    InvalidCountry,

    #[error("IBAN is too long for its country")]
    TooLong,

    #[error("IBAN is too short for its country")]
    TooShort,

    #[error("IBAN checksum is invalid")]
    InvalidChecksum,
}

impl IbanError {
    /// Stable upper-case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IbanError::Empty => "EMPTY",
            IbanError::InvalidCharacters => "INVALID_CHARACTERS",
            IbanError::InvalidFormat => "INVALID_FORMAT",
            IbanError::InvalidCountry => "INVALID_COUNTRY",
            IbanError::TooLong => "TOO_LONG",
            IbanError::TooShort => "TOO_SHORT",
            IbanError::InvalidChecksum => "INVALID_CHECKSUM",
        }
    }
}

/// Result type for the ibanscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
