//! Correction of letters that OCR commonly reads in place of digits.

/// Digit a commonly confused letter most likely stands for.
fn confused_digit(c: char) -> Option<char> {
    match c {
        'S' | 's' => Some('5'),
        'B' => Some('8'),
        'Z' => Some('7'),
        'I' | 'i' | 'l' | 'T' => Some('1'),
        'O' | 'o' | 'Q' => Some('0'),
        _ => None,
    }
}

/// Replace confusable letters with digits, leaving the country code untouched.
pub fn correct_ocr_confusions(candidate: &str) -> String {
    candidate
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i < 2 {
                c
            } else {
                confused_digit(c).unwrap_or(c)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrects_after_country_code() {
        assert_eq!(
            correct_ocr_confusions("DE89370400440S32OI3OOO"),
            "DE89370400440532013000"
        );
        assert_eq!(correct_ocr_confusions("DEB9sZlioQT"), "DE895711001");
    }

    #[test]
    fn test_country_code_kept() {
        // "SI" and "BE" would otherwise turn into digits.
        assert_eq!(correct_ocr_confusions("SI56I9I0000I234438"), "SI5619100001234438");
        assert_eq!(correct_ocr_confusions("BE68S39007547O34"), "BE68539007547034");
    }

    #[test]
    fn test_other_letters_untouched() {
        assert_eq!(correct_ocr_confusions("GB82WEST"), "GB82WE51");
        assert_eq!(correct_ocr_confusions("NLAAXY"), "NLAAXY");
        assert_eq!(correct_ocr_confusions(""), "");
    }
}
