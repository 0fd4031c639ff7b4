// Verdict - the structured outcome handed back to every caller

use crate::date_resolver::ResolvedDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// REASON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    Ok,
    NotThirteenDigits,
    InvalidDate,
    InvalidChecksum,
}

impl Reason {
    /// Message shown next to the input field
    pub fn message(&self) -> &'static str {
        match self {
            Reason::Ok => "Valid ID number.",
            Reason::NotThirteenDigits => "ID number must be 13 digits.",
            Reason::InvalidDate => "ID contains invalid date.",
            Reason::InvalidChecksum => "ID number checksum is invalid.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Reason::Ok => "OK",
            Reason::NotThirteenDigits => "NOT_THIRTEEN_DIGITS",
            Reason::InvalidDate => "INVALID_DATE",
            Reason::InvalidChecksum => "INVALID_CHECKSUM",
        }
    }
}

/// The failing subset of [`Reason`]; what [`Verdict::invalid`] accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    NotThirteenDigits,
    InvalidDate,
    InvalidChecksum,
}

impl From<Rejection> for Reason {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::NotThirteenDigits => Reason::NotThirteenDigits,
            Rejection::InvalidDate => Reason::InvalidDate,
            Rejection::InvalidChecksum => Reason::InvalidChecksum,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// GENDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Gender {
    /// 0-4 female, 5-9 male
    pub fn from_digit(digit: u8) -> Self {
        if digit < 5 {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Gender::Female => 'F',
            Gender::Male => 'M',
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// `gender` and `date_of_birth` are only ever present on a valid verdict;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    valid: bool,
    reason: Reason,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<ResolvedDate>,
}

impl Verdict {
    pub fn valid(gender: Gender, date_of_birth: ResolvedDate) -> Self {
        Verdict {
            valid: true,
            reason: Reason::Ok,
            message: Reason::Ok.message(),
            gender: Some(gender),
            date_of_birth: Some(date_of_birth),
        }
    }

    pub fn invalid(rejection: Rejection) -> Self {
        let reason = Reason::from(rejection);

        Verdict {
            valid: false,
            reason,
            message: reason.message(),
            gender: None,
            date_of_birth: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn date_of_birth(&self) -> Option<ResolvedDate> {
        self.date_of_birth
    }

    /// One-line summary for terminals and logs
    pub fn summary(&self) -> String {
        match (self.gender, self.date_of_birth) {
            (Some(gender), Some(dob)) => {
                format!("{} (born {}, gender {})", self.reason, dob, gender)
            }
            _ => format!("{}: {}", self.reason, self.message),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
