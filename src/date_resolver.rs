// 📅 Date Resolver - century disambiguation + calendar validity
//
// Two-digit years are resolved against a reference year:
//   year_digits <= reference % 100  → 2000s
//   otherwise                       → 1900s
// Someone over 100 years old cannot be told apart from someone born after
// the reference year; the rule does not try.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// DATE ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("month {month} is outside 1-12")]
    MonthOutOfRange { month: u8 },

    #[error("day {day} is outside 1-{max_day} for {year}-{month:02}")]
    DayOutOfRange {
        year: i32,
        month: u8,
        day: u8,
        max_day: u32,
    },

    #[error("{year}-{month:02}-{day:02} is not a calendar date")]
    NotACalendarDate { year: i32, month: u8, day: u8 },
}

// ============================================================================
// RESOLVED DATE
// ============================================================================

/// A real calendar date recovered from an identity number.
/// Serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedDate {
    date: NaiveDate,
}

impl ResolvedDate {
    pub fn full_year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.date
    }

    /// Canonical ISO-8601 form
    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

impl Serialize for ResolvedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Reads the wall-clock year. Call once per validation; never cache it,
/// the answer changes at year rollover.
pub fn current_reference_year() -> i32 {
    Local::now().year()
}

/// Full four-digit year for `year_digits` relative to `reference_year`.
/// `reference_year` may be a full year (2026) or already two digits (26).
pub fn resolve_full_year(year_digits: u8, reference_year: i32) -> i32 {
    let reference = reference_year.rem_euclid(100);
    let year = i32::from(year_digits);

    if year <= reference {
        2000 + year
    } else {
        1900 + year
    }
}

pub fn resolve_date(
    year_digits: u8,
    month: u8,
    day: u8,
    reference_year: i32,
) -> Result<ResolvedDate, DateError> {
    let year = resolve_full_year(year_digits, reference_year);

    if !(1..=12).contains(&month) {
        return Err(DateError::MonthOutOfRange { month });
    }

    let max_day = days_in_month(year, u32::from(month));
    if day == 0 || u32::from(day) > max_day {
        return Err(DateError::DayOutOfRange {
            year,
            month,
            day,
            max_day,
        });
    }

    let date = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .ok_or(DateError::NotACalendarDate { year, month, day })?;

    // Round trip: reading the date back must give the same triple
    if date.year() != year || date.month() != u32::from(month) || date.day() != u32::from(day) {
        return Err(DateError::NotACalendarDate { year, month, day });
    }

    Ok(ResolvedDate { date })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

// ============================================================================
// TESTS
// ============================================================================
