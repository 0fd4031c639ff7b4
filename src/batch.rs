// 📦 Batch Validation - identity numbers from a CSV import
//
// Mirrors the member import flow: a CSV with an `id_number` column goes
// in, every row gets a verdict, and the rejected rows can be written out as
// an error CSV for correction. Optional `date_of_birth` / `gender` columns
// are checked against what the ID number encodes.

use crate::declared::{Declared, Mismatch};
use crate::validator::Validator;
use crate::verdict::{Reason, Verdict};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// ROW OUTCOME
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    /// 1-based line in the source file (the header is line 1)
    pub line_number: u64,
    pub id_number: String,
    pub verdict: Verdict,
    /// Entered values that disagree with the ID (empty when none declared)
    pub mismatches: Vec<Mismatch>,
}

impl RowOutcome {
    pub fn is_clean(&self) -> bool {
        self.verdict.is_valid() && self.mismatches.is_empty()
    }
}

pub const DATE_OF_BIRTH_COLUMN: &str = "date_of_birth";
pub const GENDER_COLUMN: &str = "gender";

/// One line of the error CSV
#[derive(Debug, Serialize)]
struct RejectionRow<'a> {
    line_number: u64,
    id_number: &'a str,
    reason: &'static str,
    message: &'static str,
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub not_thirteen_digits: usize,
    pub invalid_date: usize,
    pub invalid_checksum: usize,
    /// Valid ID numbers whose declared details disagree with them
    pub declared_mismatch: usize,
}

impl BatchSummary {
    pub fn from_verdicts<'a, I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = &'a Verdict>,
    {
        let mut summary = BatchSummary::default();
        for verdict in verdicts {
            summary.record(verdict.reason());
        }
        summary
    }

    fn record(&mut self, reason: Reason) {
        self.total += 1;
        match reason {
            Reason::Ok => self.valid += 1,
            Reason::NotThirteenDigits => self.not_thirteen_digits += 1,
            Reason::InvalidDate => self.invalid_date += 1,
            Reason::InvalidChecksum => self.invalid_checksum += 1,
        }
    }

    pub fn invalid(&self) -> usize {
        self.total - self.valid
    }

    /// Rows that need correcting: invalid IDs plus declared mismatches
    pub fn rejected(&self) -> usize {
        self.invalid() + self.declared_mismatch
    }

    pub fn valid_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.valid as f64 / self.total as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ID numbers: {} valid ({:.1}%) | {} not 13 digits, {} invalid date, {} invalid checksum, {} declared mismatch",
            self.total,
            self.valid,
            self.valid_ratio() * 100.0,
            self.not_thirteen_digits,
            self.invalid_date,
            self.invalid_checksum,
            self.declared_mismatch
        )
    }
}

// ============================================================================
// BATCH REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub rows: Vec<RowOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn rejected(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|row| !row.is_clean())
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Validate the `column` of every record in `reader`
pub fn validate_csv<R: Read>(reader: R, column: &str, validator: &Validator) -> Result<BatchReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            anyhow!(
                "Column {:?} not found (headers: {})",
                column,
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })?;

    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let dob_index = find(DATE_OF_BIRTH_COLUMN);
    let gender_index = find(GENDER_COLUMN);

    let mut rows = Vec::new();
    let mut summary = BatchSummary::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV record {}", i + 1))?;
        let line_number = record
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 2);

        // Short rows count as an empty cell
        let id_number = record.get(index).unwrap_or("").trim().to_string();
        let verdict = validator.validate(&id_number);

        let (declared, mut mismatches) = Declared::from_raw(
            dob_index.and_then(|i| record.get(i)),
            gender_index.and_then(|i| record.get(i)),
        );
        if verdict.is_valid() {
            mismatches.extend(verdict.check_declared(declared.date_of_birth, declared.gender));
        } else {
            // Nothing to compare against; the ID failure is what gets reported
            mismatches.clear();
            warn!(line_number, id_number = %id_number, reason = %verdict.reason(), "rejected");
        }

        summary.record(verdict.reason());
        if !mismatches.is_empty() {
            warn!(line_number, id_number = %id_number, count = mismatches.len(), "declared details mismatch");
            summary.declared_mismatch += 1;
        }

        rows.push(RowOutcome {
            line_number,
            id_number,
            verdict,
            mismatches,
        });
    }

    info!("{}", summary.summary());

    Ok(BatchReport { rows, summary })
}

pub fn validate_csv_file(path: &Path, column: &str, validator: &Validator) -> Result<BatchReport> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    validate_csv(file, column, validator)
}

/// Error CSV: `line_number,id_number,reason,message`, one line per invalid
/// ID and one per declared mismatch. Returns the number of lines written.
pub fn write_rejections<W: Write>(report: &BatchReport, writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    for row in report.rejected() {
        let problems: Vec<(&'static str, &'static str)> = if row.verdict.is_valid() {
            row.mismatches.iter().map(|m| (m.code(), m.message())).collect()
        } else {
            vec![(row.verdict.reason().code(), row.verdict.message())]
        };

        for (reason, message) in problems {
            wtr.serialize(RejectionRow {
                line_number: row.line_number,
                id_number: &row.id_number,
                reason,
                message,
            })
            .context("Failed to write rejection row")?;
            written += 1;
        }
    }

    // Header-only file when nothing was rejected
    if written == 0 {
        wtr.write_record(["line_number", "id_number", "reason", "message"])
            .context("Failed to write rejection header")?;
    }

    wtr.flush().context("Failed to flush error CSV")?;
    Ok(written)
}

pub fn write_rejections_file(report: &BatchReport, path: &Path) -> Result<usize> {
    let file =
        File::create(path).with_context(|| format!("Failed to create error CSV: {:?}", path))?;
    write_rejections(report, file)
}

// ============================================================================
// TESTS
// ============================================================================
