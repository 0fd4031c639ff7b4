// 🪪 Validator - format check → decode → date → checksum → verdict
//
// Short-circuits at the first failing stage. Every input, however
// malformed, produces a Verdict; nothing here panics or returns Err.

use crate::checksum;
use crate::date_resolver::{current_reference_year, resolve_date};
use crate::decoder::IdentityNumber;
use crate::verdict::{Gender, Rejection, Verdict};
use tracing::debug;

/// Validate `raw` as a South African identity number.
///
/// `reference_year` drives century disambiguation of the birth year. When
/// `None`, the current year is read once for this call.
pub fn validate_identity_number(raw: &str, reference_year: Option<i32>) -> Verdict {
    // 1. Format
    let id = match IdentityNumber::parse(raw) {
        Ok(id) => id,
        Err(e) => {
            debug!(error = %e, "format check failed");
            return Verdict::invalid(Rejection::NotThirteenDigits);
        }
    };

    // 2. Decode
    let fields = id.decode();

    // 3. Date
    let reference_year = reference_year.unwrap_or_else(current_reference_year);
    let date_of_birth =
        match resolve_date(fields.year_digits, fields.month, fields.day, reference_year) {
            Ok(date) => date,
            Err(e) => {
                debug!(id_number = %id, reference_year, error = %e, "date check failed");
                return Verdict::invalid(Rejection::InvalidDate);
            }
        };

    // 4. Checksum
    if !checksum::evaluate(&id).valid {
        return Verdict::invalid(Rejection::InvalidChecksum);
    }

    Verdict::valid(Gender::from_digit(fields.gender_digit), date_of_birth)
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Validation with an optional pinned reference year.
///
/// Adapters build one from configuration; an unpinned validator reads the
/// clock on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    reference_year: Option<i32>,
}

impl Validator {
    pub fn new() -> Self {
        Validator {
            reference_year: None,
        }
    }

    pub fn with_reference_year(reference_year: i32) -> Self {
        Validator {
            reference_year: Some(reference_year),
        }
    }

    pub fn from_optional(reference_year: Option<i32>) -> Self {
        Validator { reference_year }
    }

    pub fn reference_year(&self) -> Option<i32> {
        self.reference_year
    }

    pub fn validate(&self, raw: &str) -> Verdict {
        validate_identity_number(raw, self.reference_year)
    }

    pub fn validate_many<'a, I>(&self, raws: I) -> Vec<Verdict>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raws.into_iter().map(|raw| self.validate(raw)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
