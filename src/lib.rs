// SA ID Validator - Core Library
// Exposes the validator for the CLI, the terminal UI, the API server, and tests

pub mod decoder;       // Positional slicing of the 13 digits
pub mod date_resolver; // Century disambiguation + calendar checks
pub mod checksum;      // Luhn over all 13 digits
pub mod verdict;       // Reason / Gender / Verdict
pub mod validator;     // Facade
pub mod config;        // Environment configuration
pub mod declared;      // Declared DOB/gender vs the ID
pub mod batch;         // CSV batch validation

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use decoder::{DecodedFields, FormatError, IdentityNumber, ID_LENGTH};
pub use date_resolver::{
    current_reference_year, resolve_date, resolve_full_year, DateError, ResolvedDate,
};
pub use checksum::{check_digit, ChecksumReport};
pub use verdict::{Gender, Reason, Rejection, Verdict};
pub use declared::{parse_declared_date, Declared, Mismatch};
pub use validator::{validate_identity_number, Validator};
pub use config::Config;
pub use batch::{
    validate_csv, validate_csv_file, write_rejections, BatchReport, BatchSummary, RowOutcome,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
