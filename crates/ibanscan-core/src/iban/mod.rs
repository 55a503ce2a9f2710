//! IBAN extraction, validation and result filtering.

pub mod correction;
pub mod countries;
pub mod filter;
pub mod patterns;
pub mod recognizer;
pub mod validator;

pub use correction::correct_ocr_confusions;
pub use countries::{country_codes, iban_length, COUNTRY_IBAN_LENGTHS};
pub use filter::{IbansListener, ProcessingListener, RecognizerFilter};
pub use patterns::find_candidates;
pub use recognizer::{IbanExtractor, IbanRecognizer, RecognitionFuture, RecognitionOutcome};
pub use validator::{format_iban, is_valid_iban, validate_iban, Iban};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
