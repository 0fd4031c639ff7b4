// 🧾 Declared Details - compare what was entered on a form against the ID
//
// Member forms carry a date of birth (and sometimes a gender) typed in
// separately from the ID number. When the ID is valid, the entered values
// must agree with what the ID encodes. Blank declared values are filled
// from the ID instead of being compared.

use crate::verdict::{Gender, Verdict};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Formats accepted for an entered date of birth
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

// ============================================================================
// MISMATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mismatch {
    DateOfBirth { declared: NaiveDate, derived: NaiveDate },
    Gender { declared: Gender, derived: Gender },
    UnreadableDateOfBirth { value: String },
    UnreadableGender { value: String },
}

impl Mismatch {
    pub fn code(&self) -> &'static str {
        match self {
            Mismatch::DateOfBirth { .. } => "DATE_OF_BIRTH_MISMATCH",
            Mismatch::Gender { .. } => "GENDER_MISMATCH",
            Mismatch::UnreadableDateOfBirth { .. } => "UNREADABLE_DATE_OF_BIRTH",
            Mismatch::UnreadableGender { .. } => "UNREADABLE_GENDER",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Mismatch::DateOfBirth { .. } => "Date of birth does not match ID number.",
            Mismatch::Gender { .. } => "Gender does not match ID number.",
            Mismatch::UnreadableDateOfBirth { .. } => "Date of birth is not a valid date.",
            Mismatch::UnreadableGender { .. } => "Gender must be M or F.",
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// PARSING ENTERED VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised value {0:?}")]
pub struct UnreadableValue(pub String);

impl FromStr for Gender {
    type Err = UnreadableValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "female" => Ok(Gender::Female),
            "m" | "male" => Ok(Gender::Male),
            _ => Err(UnreadableValue(s.to_string())),
        }
    }
}

pub fn parse_declared_date(raw: &str) -> Result<NaiveDate, UnreadableValue> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| UnreadableValue(raw.to_string()))
}

// ============================================================================
// DECLARED DETAILS
// ============================================================================

/// Values entered next to the ID number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Declared {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl Declared {
    /// Parse raw cell text. Blank cells are `None`; unreadable cells are
    /// reported as mismatches and otherwise treated as blank.
    pub fn from_raw(date_of_birth: Option<&str>, gender: Option<&str>) -> (Self, Vec<Mismatch>) {
        let mut declared = Declared::default();
        let mut problems = Vec::new();

        if let Some(raw) = date_of_birth.map(str::trim).filter(|v| !v.is_empty()) {
            match parse_declared_date(raw) {
                Ok(date) => declared.date_of_birth = Some(date),
                Err(UnreadableValue(value)) => {
                    problems.push(Mismatch::UnreadableDateOfBirth { value })
                }
            }
        }

        if let Some(raw) = gender.map(str::trim).filter(|v| !v.is_empty()) {
            match raw.parse::<Gender>() {
                Ok(g) => declared.gender = Some(g),
                Err(UnreadableValue(value)) => problems.push(Mismatch::UnreadableGender { value }),
            }
        }

        (declared, problems)
    }

    /// ID-derived values win; entered values only survive where the ID has
    /// nothing to say (invalid verdict).
    pub fn filled_from(&self, verdict: &Verdict) -> Declared {
        Declared {
            date_of_birth: verdict
                .date_of_birth()
                .map(|d| d.as_naive_date())
                .or(self.date_of_birth),
            gender: verdict.gender().or(self.gender),
        }
    }
}

impl Verdict {
    /// Compare entered values against the ID. Only a valid verdict has
    /// anything to compare; missing entered values are not mismatches.
    pub fn check_declared(&self, date_of_birth: Option<NaiveDate>, gender: Option<Gender>) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();

        if let (Some(declared), Some(derived)) = (date_of_birth, self.date_of_birth()) {
            let derived = derived.as_naive_date();
            if declared != derived {
                mismatches.push(Mismatch::DateOfBirth { declared, derived });
            }
        }

        if let (Some(declared), Some(derived)) = (gender, self.gender()) {
            if declared != derived {
                mismatches.push(Mismatch::Gender { declared, derived });
            }
        }

        mismatches
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_identity_number;
    use crate::verdict::Reason;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn thabo() -> Verdict {
        validate_identity_number("8001015009087", Some(2026))
    }

    #[test]
    fn test_matching_date_of_birth() {
        let mismatches = thabo().check_declared(Some(ymd(1980, 1, 1)), Some(Gender::Male));
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_mismatching_date_of_birth() {
        let mismatches = thabo().check_declared(Some(ymd(1980, 1, 2)), None);

        assert_eq!(
            mismatches,
            vec![Mismatch::DateOfBirth {
                declared: ymd(1980, 1, 2),
                derived: ymd(1980, 1, 1),
            }]
        );
        assert_eq!(mismatches[0].message(), "Date of birth does not match ID number.");
    }

    #[test]
    fn test_missing_declared_date_of_birth_is_not_a_mismatch() {
        assert!(thabo().check_declared(None, None).is_empty());
    }

    #[test]
    fn test_mismatching_gender() {
        let mismatches = thabo().check_declared(None, Some(Gender::Female));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].code(), "GENDER_MISMATCH");
    }

    #[test]
    fn test_invalid_verdict_has_nothing_to_compare() {
        let verdict = validate_identity_number("8001015009088", Some(2026));
        assert_eq!(verdict.reason(), Reason::InvalidChecksum);
        assert!(verdict
            .check_declared(Some(ymd(1999, 9, 9)), Some(Gender::Female))
            .is_empty());
    }

    #[test]
    fn test_from_raw() {
        let (declared, problems) = Declared::from_raw(Some(" 01/01/1980 "), Some("male"));
        assert!(problems.is_empty());
        assert_eq!(declared.date_of_birth, Some(ymd(1980, 1, 1)));
        assert_eq!(declared.gender, Some(Gender::Male));

        let (declared, problems) = Declared::from_raw(Some(""), None);
        assert_eq!(declared, Declared::default());
        assert!(problems.is_empty());
    }

    #[test]
    fn test_from_raw_reports_unreadable_values() {
        let (declared, problems) = Declared::from_raw(Some("1980-02-30"), Some("X"));
        assert_eq!(declared, Declared::default());
        assert_eq!(
            problems,
            vec![
                Mismatch::UnreadableDateOfBirth {
                    value: "1980-02-30".to_string()
                },
                Mismatch::UnreadableGender {
                    value: "X".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_filled_from_prefers_id_values() {
        let entered = Declared {
            date_of_birth: Some(ymd(1999, 9, 9)),
            gender: None,
        };

        let filled = entered.filled_from(&thabo());
        assert_eq!(filled.date_of_birth, Some(ymd(1980, 1, 1)));
        assert_eq!(filled.gender, Some(Gender::Male));

        let invalid = validate_identity_number("800101500908", Some(2026));
        assert_eq!(entered.filled_from(&invalid), entered);
    }

    #[test]
    fn test_mismatch_json() {
        let json = serde_json::to_value(Mismatch::DateOfBirth {
            declared: ymd(1980, 1, 2),
            derived: ymd(1980, 1, 1),
        })
        .unwrap();
        assert_eq!(json["kind"], "DATE_OF_BIRTH");
        assert_eq!(json["declared"], "1980-01-02");
    }
}
