// 🔢 Decoder - positional slicing of the 13-digit identity number
//
// Layout (YYMMDD G SSSSS C):
//   0-1  year digits
//   2-3  month
//   4-5  day
//   6    gender digit
//   7-11 sequence (not used for validation)
//   12   check digit

use std::fmt;
use thiserror::Error;

/// Number of digits in a South African identity number
pub const ID_LENGTH: usize = 13;

// ============================================================================
// FORMAT ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("expected 13 characters, got {length}")]
    WrongLength { length: usize },

    #[error("non-digit character {found:?} at position {position}")]
    NonDigit { position: usize, found: char },
}

// ============================================================================
// IDENTITY NUMBER
// ============================================================================

/// A string that passed the format gate: exactly 13 ASCII decimal digits.
///
/// The only way to get one is [`IdentityNumber::parse`], so anything holding
/// an `IdentityNumber` can decode it without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityNumber {
    digits: [u8; ID_LENGTH],
}

impl IdentityNumber {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let length = raw.chars().count();
        if length != ID_LENGTH {
            return Err(FormatError::WrongLength { length });
        }

        let mut digits = [0u8; ID_LENGTH];
        for (position, ch) in raw.chars().enumerate() {
            // to_digit accepts only '0'..='9' for radix 10, so non-ASCII
            // numerals (Arabic-Indic etc.) land here too
            let digit = ch
                .to_digit(10)
                .ok_or(FormatError::NonDigit { position, found: ch })?;
            digits[position] = digit as u8;
        }

        Ok(IdentityNumber { digits })
    }

    pub fn digits(&self) -> &[u8; ID_LENGTH] {
        &self.digits
    }

    /// The first twelve digits (everything except the check digit)
    pub fn payload(&self) -> [u8; ID_LENGTH - 1] {
        let mut payload = [0u8; ID_LENGTH - 1];
        payload.copy_from_slice(&self.digits[..ID_LENGTH - 1]);
        payload
    }

    pub fn decode(&self) -> DecodedFields {
        DecodedFields {
            year_digits: self.number_at(0, 2) as u8,
            month: self.number_at(2, 2) as u8,
            day: self.number_at(4, 2) as u8,
            gender_digit: self.digits[6],
            sequence: self.number_at(7, 5),
            check_digit: self.digits[12],
        }
    }

    /// Base-10 value of `len` digits starting at `start`
    fn number_at(&self, start: usize, len: usize) -> u32 {
        self.digits[start..start + len]
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(*d))
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for IdentityNumber {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdentityNumber::parse(s)
    }
}

// ============================================================================
// DECODED FIELDS
// ============================================================================

/// Raw fields sliced out of an identity number. Month and day are not
/// checked here; the date resolver does that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFields {
    pub year_digits: u8,
    pub month: u8,
    pub day: u8,
    pub gender_digit: u8,
    pub sequence: u32,
    pub check_digit: u8,
}

// ============================================================================
// TESTS
// ============================================================================
