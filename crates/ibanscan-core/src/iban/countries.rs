//! Fixed IBAN lengths per country, following the SWIFT IBAN registry.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Country code and total IBAN length (country code and check digits included).
pub const COUNTRY_IBAN_LENGTHS: &[(&str, usize)] = &[
    ("AD", 24),
    ("AE", 23),
    ("AL", 28),
    ("AT", 20),
    ("AZ", 28),
    ("BA", 20),
    ("BE", 16),
    ("BG", 22),
    ("BH", 22),
    ("BR", 29),
    ("BY", 28),
    ("CH", 21),
    ("CR", 22),
    ("CY", 28),
    ("CZ", 24),
    ("DE", 22),
    ("DK", 18),
    ("DO", 28),
    ("EE", 20),
    ("EG", 29),
    ("ES", 24),
    ("FI", 18),
    ("FO", 18),
    ("FR", 27),
    ("GB", 22),
    ("GE", 22),
    ("GI", 23),
    ("GL", 18),
    ("GR", 27),
    ("GT", 28),
    ("HR", 21),
    ("HU", 28),
    ("IE", 22),
    ("IL", 23),
    ("IQ", 23),
    ("IS", 26),
    ("IT", 27),
    ("JO", 30),
    ("KW", 30),
    ("KZ", 20),
    ("LB", 28),
    ("LC", 32),
    ("LI", 21),
    ("LT", 20),
    ("LU", 20),
    ("LV", 21),
    ("MC", 27),
    ("MD", 24),
    ("ME", 22),
    ("MK", 19),
    ("MR", 27),
    ("MT", 31),
    ("MU", 30),
    ("NL", 18),
    ("NO", 15),
    ("PK", 24),
    ("PL", 28),
    ("PS", 29),
    ("PT", 25),
    ("QA", 29),
    ("RO", 24),
    ("RS", 22),
    ("SA", 24),
    ("SC", 31),
    ("SE", 24),
    ("SI", 19),
    ("SK", 24),
    ("SM", 27),
    ("ST", 25),
    ("SV", 28),
    ("TL", 23),
    ("TN", 24),
    ("TR", 26),
    ("UA", 29),
    ("VA", 22),
    ("VG", 24),
    ("XK", 20),
];

lazy_static! {
    static ref LENGTHS: HashMap<&'static str, usize> =
        COUNTRY_IBAN_LENGTHS.iter().copied().collect();
}

/// Required IBAN length for a 2-letter country code.
pub fn iban_length(country_code: &str) -> Option<usize> {
    LENGTHS.get(country_code).copied()
}

/// Known country codes in table order.
pub fn country_codes() -> impl Iterator<Item = &'static str> {
    COUNTRY_IBAN_LENGTHS.iter().map(|(code, _)| *code)
}

/// Regex alternation of all known country codes (`AD|AE|...`).
pub fn country_alternation() -> String {
    country_codes().collect::<Vec<_>>().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        for (code, len) in COUNTRY_IBAN_LENGTHS {
            assert_eq!(code.len(), 2, "{code}");
            assert!(code.chars().all(|c| c.is_ascii_uppercase()), "{code}");
            assert!((15..=32).contains(len), "{code}: {len}");
        }
        assert_eq!(LENGTHS.len(), COUNTRY_IBAN_LENGTHS.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(iban_length("DE"), Some(22));
        assert_eq!(iban_length("NO"), Some(15));
        assert_eq!(iban_length("LC"), Some(32));
        assert_eq!(iban_length("XX"), None);
        assert_eq!(iban_length("de"), None);
    }

    #[test]
    fn test_alternation() {
        let alternation = country_alternation();
        assert!(alternation.starts_with("AD|AE|"));
        assert!(alternation.contains("|DE|"));
        assert_eq!(alternation.split('|').count(), COUNTRY_IBAN_LENGTHS.len());
    }
}
