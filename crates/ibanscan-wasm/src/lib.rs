//! WASM bindings for IBAN extraction and validation.
//!
//! Text recognition runs on the JavaScript side; these bindings take the
//! recognized text and return the IBANs found in it.

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use ibanscan_core::{Iban, IbanError};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Validate an IBAN (spaces allowed, case-insensitive).
#[wasm_bindgen]
pub fn validate_iban(iban: &str) -> bool {
    ibanscan_core::is_valid_iban(iban)
}

/// Why an IBAN is invalid (e.g. `"INVALID_CHECKSUM"`), or `undefined` if it is valid.
#[wasm_bindgen]
pub fn iban_error(iban: &str) -> Option<String> {
    ibanscan_core::validate_iban(iban)
        .err()
        .map(|e: IbanError| e.kind().to_string())
}

/// Format IBAN in groups of 4.
#[wasm_bindgen]
pub fn format_iban(iban: &str) -> String {
    ibanscan_core::format_iban(iban)
}

/// Split a valid IBAN into its parts.
#[wasm_bindgen]
pub fn describe_iban(iban: &str) -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    struct Description {
        iban: String,
        formatted: String,
        country_code: String,
        check_digits: String,
        bban: String,
    }

    let parsed = Iban::parse(iban).map_err(|e| JsValue::from_str(e.kind()))?;
    let description = Description {
        iban: parsed.as_str().to_string(),
        formatted: parsed.formatted(),
        country_code: parsed.country_code().to_string(),
        check_digits: parsed.check_digits().to_string(),
        bban: parsed.bban().to_string(),
    };

    serde_wasm_bindgen::to_value(&description).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract IBANs from recognized text with the default settings.
#[wasm_bindgen]
pub fn extract_ibans(text: &str) -> Array {
    IbanExtractor::new().extract(text)
}

/// IBAN extractor class for browser use.
#[wasm_bindgen]
pub struct IbanExtractor {
    inner: ibanscan_core::IbanExtractor,
}

#[wasm_bindgen]
impl IbanExtractor {
    /// Create an extractor preferring German IBANs, with OCR correction enabled.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: ibanscan_core::IbanExtractor::new(),
        }
    }

    /// Regex selecting the IBANs returned in preference to the others.
    #[wasm_bindgen(getter)]
    pub fn preferred_pattern(&self) -> String {
        self.inner.preferred_pattern().to_string()
    }

    /// Replace the preferred pattern. Fails if the regex does not compile.
    #[wasm_bindgen]
    pub fn set_preferred_pattern(&mut self, pattern: &str) -> Result<(), JsValue> {
        self.inner = self
            .inner
            .clone()
            .with_preferred_pattern(pattern)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Configure OCR confusion correction.
    #[wasm_bindgen]
    pub fn set_ocr_correction(&mut self, enabled: bool) {
        self.inner = self.inner.clone().with_ocr_correction(enabled);
    }

    /// Extract IBANs from text, as an array of strings.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Array {
        self.ibans(text).into_iter().map(JsValue::from).collect()
    }
}

impl IbanExtractor {
    fn ibans(&self, text: &str) -> Vec<String> {
        self.inner.extract_ibans(text)
    }
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_test_configure!(run_in_browser);

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn test_validate_iban() {
        assert!(validate_iban("DE89 3704 0044 0532 0130 00"));
        assert!(!validate_iban("DE00370400440532013000"));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn test_iban_error() {
        assert_eq!(iban_error("DE89370400440532013000"), None);
        assert_eq!(
            iban_error("DE00370400440532013000").as_deref(),
            Some("INVALID_CHECKSUM")
        );
        assert_eq!(iban_error("").as_deref(), Some("EMPTY"));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn test_format_iban() {
        assert_eq!(format_iban("NO9386011117947"), "NO93 8601 1117 947");
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn test_extractor_settings() {
        let mut extractor = IbanExtractor::new();
        let text = "GB82 WEST 1234 5698 7654 32 / DE89 3704 0044 0532 0130 00";
        assert_eq!(extractor.ibans(text), vec!["DE89370400440532013000"]);

        extractor.set_preferred_pattern("^GB").unwrap();
        assert_eq!(extractor.preferred_pattern(), "^GB");
        assert_eq!(extractor.ibans(text), vec!["GB82WEST12345698765432"]);
    }
}
