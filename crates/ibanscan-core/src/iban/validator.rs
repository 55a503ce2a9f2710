//! IBAN structure and checksum validation (ISO 7064 mod-97-10).

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::countries::iban_length;
use crate::error::IbanError;

/// An IBAN that passed character, format, country, length and checksum checks.
///
/// Stored in compact upper-case form without spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iban(String);

impl Iban {
    /// Normalize and validate `input`.
    pub fn parse(input: &str) -> Result<Self, IbanError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IbanError::Empty);
        }

        let iban: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if !iban.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(IbanError::InvalidCharacters);
        }

        // ASCII only from here on, so byte slicing is safe.
        let bytes = iban.as_bytes();
        if bytes.len() < 4
            || !bytes[..2].iter().all(u8::is_ascii_uppercase)
            || !bytes[2..4].iter().all(u8::is_ascii_digit)
        {
            return Err(IbanError::InvalidFormat);
        }

        let required = iban_length(&iban[..2]).ok_or(IbanError::InvalidCountry)?;
        if iban.len() > required {
            return Err(IbanError::TooLong);
        }
        if iban.len() < required {
            return Err(IbanError::TooShort);
        }

        if checksum(&iban) != 1 {
            return Err(IbanError::InvalidChecksum);
        }

        Ok(Self(iban))
    }

    /// Compact form, e.g. `DE89370400440532013000`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-letter country code.
    pub fn country_code(&self) -> &str {
        &self.0[..2]
    }

    /// The two check digits.
    pub fn check_digits(&self) -> &str {
        &self.0[2..4]
    }

    /// Basic Bank Account Number (everything after the check digits).
    pub fn bban(&self) -> &str {
        &self.0[4..]
    }

    /// Print form in groups of four.
    pub fn formatted(&self) -> String {
        format_iban(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iban {
    type Err = IbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Iban {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Iban {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Validate an IBAN, reporting the first failing check.
pub fn validate_iban(iban: &str) -> Result<(), IbanError> {
    Iban::parse(iban).map(|_| ())
}

/// Whether `iban` is a valid IBAN.
pub fn is_valid_iban(iban: &str) -> bool {
    validate_iban(iban).is_ok()
}

/// Remainder of the rearranged numeric IBAN divided by 97.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. Reduce mod 97 digit by digit (the number is too large for u64)
///
/// Expects upper-case ASCII alphanumerics.
fn checksum(iban: &str) -> u32 {
    let (head, tail) = iban.split_at(4);

    tail.bytes().chain(head.bytes()).fold(0u32, |remainder, b| {
        if b.is_ascii_digit() {
            (remainder * 10 + u32::from(b - b'0')) % 97
        } else {
            (remainder * 100 + u32::from(b) - 55) % 97
        }
    })
}

/// Format IBAN in groups of 4 characters.
pub fn format_iban(iban: &str) -> String {
    let cleaned: Vec<char> = iban.chars().filter(|c| !c.is_whitespace()).collect();

    cleaned
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "DE78500105172594181438";

    #[test]
    fn test_validate_iban_valid() {
        assert_eq!(validate_iban(VALID), Ok(()));
        assert_eq!(validate_iban("DE89370400440532013000"), Ok(()));
        assert_eq!(validate_iban("GB82 WEST 1234 5698 7654 32"), Ok(()));
        assert_eq!(validate_iban("PL61109010140000071219812874"), Ok(()));
        assert_eq!(validate_iban("NO9386011117947"), Ok(()));
        assert_eq!(validate_iban("de89370400440532013000"), Ok(()));
    }

    #[test]
    fn test_single_digit_mutation_breaks_checksum() {
        for (i, c) in VALID.char_indices().skip(2) {
            let digit = c.to_digit(10).unwrap();
            let mutated_digit = char::from_digit((digit + 1) % 10, 10).unwrap();
            let mut mutated = VALID.to_string();
            mutated.replace_range(i..i + 1, &mutated_digit.to_string());
            assert_eq!(
                validate_iban(&mutated),
                Err(IbanError::InvalidChecksum),
                "{mutated}"
            );
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(validate_iban(""), Err(IbanError::Empty));
        assert_eq!(validate_iban("   "), Err(IbanError::Empty));
        assert_eq!(
            validate_iban("DE89-3704-0044-0532-0130-00"),
            Err(IbanError::InvalidCharacters)
        );
        assert_eq!(validate_iban("DEÄ9370400440532013000"), Err(IbanError::InvalidCharacters));
        assert_eq!(validate_iban("1E89370400440532013000"), Err(IbanError::InvalidFormat));
        assert_eq!(validate_iban("DEX9370400440532013000"), Err(IbanError::InvalidFormat));
        assert_eq!(validate_iban("DE8"), Err(IbanError::InvalidFormat));
        assert_eq!(validate_iban("XX89370400440532013000"), Err(IbanError::InvalidCountry));
        assert_eq!(validate_iban("DE8937040044053201300"), Err(IbanError::TooShort));
        assert_eq!(validate_iban("DE893704004405320130000"), Err(IbanError::TooLong));
        assert_eq!(validate_iban("DE00370400440532013000"), Err(IbanError::InvalidChecksum));
    }

    #[test]
    fn test_length_checked_before_checksum() {
        // Padded with two zeros and check digits recomputed: passes mod-97
        // arithmetically but has 24 characters where Germany requires 22.
        let padded = "DE9837040044053201300000";
        assert_eq!(checksum(padded), 1);
        assert_eq!(validate_iban(padded), Err(IbanError::TooLong));

        // Truncated variant with recomputed check digits.
        let truncated = "DE5137040044053201300";
        assert_eq!(checksum(truncated), 1);
        assert_eq!(validate_iban(truncated), Err(IbanError::TooShort));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let spaced = " DE78 5001 0517 2594 1814 38 ";
        let partly = "DE785001 05172594 181438";
        assert_eq!(validate_iban(spaced), validate_iban(VALID));
        assert_eq!(validate_iban(partly), validate_iban(VALID));
        assert_eq!(Iban::parse(spaced).unwrap(), Iban::parse(VALID).unwrap());
    }

    #[test]
    fn test_iban_parts() {
        let iban: Iban = "gb82 west 1234 5698 7654 32".parse().unwrap();
        assert_eq!(iban.as_str(), "GB82WEST12345698765432");
        assert_eq!(iban.country_code(), "GB");
        assert_eq!(iban.check_digits(), "82");
        assert_eq!(iban.bban(), "WEST12345698765432");
        assert_eq!(iban.formatted(), "GB82 WEST 1234 5698 7654 32");
        assert_eq!(iban.to_string(), "GB82WEST12345698765432");
        assert_eq!(
            serde_json::to_string(&iban).unwrap(),
            "\"GB82WEST12345698765432\""
        );
    }

    #[test]
    fn test_format_iban() {
        assert_eq!(
            format_iban("DE83500105175744527463"),
            "DE83 5001 0517 5744 5274 63"
        );
        assert_eq!(
            format_iban("PL61109010140000071219812874"),
            "PL61 1090 1014 0000 0712 1981 2874"
        );
        assert_eq!(format_iban("DE83 5001 0517 5744 5274 63"), "DE83 5001 0517 5744 5274 63");
        assert_eq!(format_iban(""), "");
    }
}
