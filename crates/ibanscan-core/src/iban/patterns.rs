//! Regex patterns for finding IBAN-shaped text.
//!
//! Both patterns are built from the country length table, so adding a
//! country there is enough for it to be recognized here.

use lazy_static::lazy_static;
use regex::Regex;

use super::countries::country_alternation;

lazy_static! {
    // Single line: optional space after the country code and after the check
    // digits, then either a spaced/hyphenated body or a contiguous one.
    // Unanchored, so an IBAN glued to its label ("IBANDE89...") still matches.
    pub static ref IBAN_SINGLE_LINE: Regex = Regex::new(&format!(
        r"(?:{}) ?\d{{2}} ?(?:[A-Za-z0-9][A-Za-z0-9 \-]{{9,48}}[A-Za-z0-9]|[A-Za-z0-9]{{11,30}})",
        country_alternation()
    ))
    .unwrap();

    // Blocks of four, possibly broken across lines, with a short tail group.
    pub static ref IBAN_BLOCKS: Regex = Regex::new(&format!(
        r"\b(?:{})\d{{2}}(?:\s{{0,3}}[A-Za-z0-9]{{4}}){{2,8}}\s{{0,3}}[A-Za-z0-9]{{1,4}}\b",
        country_alternation()
    ))
    .unwrap();
}

/// Find IBAN candidates in recognized text.
///
/// Returns the single-line matches followed by the block matches, each in
/// text order. Nothing is deduplicated or validated here.
pub fn find_candidates(text: &str) -> Vec<String> {
    IBAN_SINGLE_LINE
        .find_iter(text)
        .chain(IBAN_BLOCKS.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_compact() {
        let text = "Bitte überweisen an DE89370400440532013000.";
        assert_eq!(
            IBAN_SINGLE_LINE
                .find_iter(text)
                .map(|m| m.as_str())
                .collect::<Vec<_>>(),
            vec!["DE89370400440532013000"]
        );
    }

    #[test]
    fn test_single_line_glued_to_label() {
        // OCR dropped the separator between the label and the IBAN.
        assert_eq!(
            find_candidates("IBANDE89370400440532013000"),
            vec!["DE89370400440532013000"]
        );
    }

    #[test]
    fn test_trailing_words_caught_by_blocks() {
        // The single-line body is greedy and runs into the following words.
        let text = "an DE89370400440532013000 bis Freitag.";
        assert_eq!(
            find_candidates(text),
            vec![
                "DE89370400440532013000 bis Freitag",
                "DE89370400440532013000",
            ]
        );
    }

    #[test]
    fn test_single_line_spaced() {
        let text = "IBAN: DE89 3704 0044 0532 0130 00\nBIC: COBADEFFXXX";
        let found: Vec<_> = IBAN_SINGLE_LINE.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["DE89 3704 0044 0532 0130 00"]);
    }

    #[test]
    fn test_blocks_across_lines() {
        let text = "Konto DE89 3704\n0044 0532\n0130 00";
        let found: Vec<_> = IBAN_BLOCKS.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["DE89 3704\n0044 0532\n0130 00"]);
    }

    #[test]
    fn test_candidates_order() {
        let text = "DE89 3704 0044 0532 0130 00\nand GB82 WEST 1234 5698 7654 32";
        let candidates = find_candidates(text);
        assert_eq!(
            candidates,
            vec![
                "DE89 3704 0044 0532 0130 00",
                "GB82 WEST 1234 5698 7654 32",
                "DE89 3704 0044 0532 0130 00",
                "GB82 WEST 1234 5698 7654 32",
            ]
        );
    }

    #[test]
    fn test_unknown_country_ignored() {
        assert!(find_candidates("XX89 3704 0044 0532 0130 00").is_empty());
        assert!(find_candidates("no bank details here").is_empty());
    }
}
