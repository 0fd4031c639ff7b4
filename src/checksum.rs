// ✅ Checksum Validator - Luhn over all 13 digits
//
// Right to left, every second digit (starting with the one left of the
// check digit) is doubled and reduced by 9 when it exceeds 9. The number is
// valid when the total, check digit included, is divisible by 10.

use crate::decoder::{IdentityNumber, ID_LENGTH};
use serde::Serialize;

// ============================================================================
// CHECKSUM REPORT
// ============================================================================

/// Breakdown of a checksum evaluation, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecksumReport {
    /// Luhn sum over all 13 digits
    pub sum: u32,
    /// Check digit the first twelve digits call for
    pub expected: u8,
    /// Check digit actually present
    pub actual: u8,
    pub valid: bool,
}

// ============================================================================
// LUHN
// ============================================================================

/// Luhn sum of `digits`, with the rightmost digit not doubled
pub fn luhn_sum(digits: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut double = false;

    for &digit in digits.iter().rev() {
        let mut n = u32::from(digit);
        if double {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        sum += n;
        double = !double;
    }

    sum
}

pub fn is_valid(id: &IdentityNumber) -> bool {
    luhn_sum(id.digits()) % 10 == 0
}

/// Check digit that completes `payload` into a valid identity number
pub fn check_digit(payload: &[u8; ID_LENGTH - 1]) -> u8 {
    // Appending a zero shifts the doubling pattern onto the payload exactly
    // as the real check digit would
    let mut digits = [0u8; ID_LENGTH];
    digits[..ID_LENGTH - 1].copy_from_slice(payload);

    let sum = luhn_sum(&digits);
    ((10 - sum % 10) % 10) as u8
}

pub fn evaluate(id: &IdentityNumber) -> ChecksumReport {
    let sum = luhn_sum(id.digits());
    let report = ChecksumReport {
        sum,
        expected: check_digit(&id.payload()),
        actual: id.digits()[ID_LENGTH - 1],
        valid: sum % 10 == 0,
    };

    tracing::debug!(
        id_number = %id,
        sum = report.sum,
        expected = report.expected,
        actual = report.actual,
        valid = report.valid,
        "checksum evaluated"
    );

    report
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> IdentityNumber {
        IdentityNumber::parse(raw).unwrap()
    }

    const VALID: [&str; 10] = [
        "8001015009087",
        "9202204720083",
        "0002290123088",
        "9602295800084",
        "0102290123086",
        "2601010000084",
        "2706154999189",
        "0001010000006",
        "9912319999089",
        "8507040123081",
    ];

    /// The split-sum rule some older forms used: odd positions summed, even
    /// positions concatenated into one number, doubled, and digit-summed.
    fn split_sum_check_digit(payload: &[u8; 12]) -> u8 {
        let odd_sum: u32 = payload.iter().step_by(2).map(|d| u32::from(*d)).sum();
        let even_number: u64 = payload
            .iter()
            .skip(1)
            .step_by(2)
            .fold(0u64, |acc, d| acc * 10 + u64::from(*d));
        let even_sum: u32 = (even_number * 2)
            .to_string()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .sum();

        ((10 - (odd_sum + even_sum) % 10) % 10) as u8
    }

    #[test]
    fn test_luhn_sum_known_value() {
        // 8 0 0 1 0 1 5 0 0 9 0 8 7 -> 13 undoubled + 20 doubled + 7
        assert_eq!(luhn_sum(id("8001015009087").digits()), 40);
    }

    #[test]
    fn test_valid_numbers_pass() {
        for raw in VALID {
            assert!(is_valid(&id(raw)), "{} should pass", raw);
        }
    }

    #[test]
    fn test_altered_check_digit_fails() {
        for raw in VALID {
            let parsed = id(raw);
            let actual = parsed.digits()[12];
            for replacement in 0..10u8 {
                if replacement == actual {
                    continue;
                }
                let altered = format!("{}{}", &raw[..12], replacement);
                assert!(!is_valid(&id(&altered)), "{} should fail", altered);
            }
        }
    }

    #[test]
    fn test_single_digit_transcription_error_detected() {
        // Changing any one digit breaks the checksum
        let raw = "8001015009087";
        for position in 0..13 {
            let original = raw.as_bytes()[position] - b'0';
            let changed = (original + 1) % 10;
            let mut altered = raw.to_string();
            altered.replace_range(position..position + 1, &changed.to_string());
            assert!(!is_valid(&id(&altered)), "{} should fail", altered);
        }
    }

    #[test]
    fn test_all_zeros_passes_checksum() {
        assert!(is_valid(&id("0000000000000")));
    }

    #[test]
    fn test_check_digit() {
        for raw in VALID {
            let parsed = id(raw);
            assert_eq!(check_digit(&parsed.payload()), parsed.digits()[12]);
        }
    }

    #[test]
    fn test_evaluate_report() {
        let report = evaluate(&id("8001015009080"));
        assert_eq!(report.expected, 7);
        assert_eq!(report.actual, 0);
        assert_eq!(report.sum, 33);
        assert!(!report.valid);

        let report = evaluate(&id("8001015009087"));
        assert!(report.valid);
        assert_eq!(report.expected, report.actual);
    }

    #[test]
    fn test_split_sum_rule_agrees_with_luhn() {
        let mut payloads: Vec<[u8; 12]> = VALID.iter().map(|raw| id(raw).payload()).collect();
        // Leading zeros in the even positions
        payloads.push([0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
        payloads.push([0; 12]);
        payloads.push([9; 12]);

        for payload in payloads {
            assert_eq!(split_sum_check_digit(&payload), check_digit(&payload));
        }
    }
}
