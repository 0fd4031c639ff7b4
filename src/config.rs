// Configuration from the environment. CLI flags override these.

use anyhow::{bail, Context, Result};
use std::env;

pub const ENV_REFERENCE_YEAR: &str = "SA_ID_REFERENCE_YEAR";
pub const ENV_COLUMN: &str = "SA_ID_COLUMN";
pub const ENV_SERVER_ADDR: &str = "SA_ID_SERVER_ADDR";

pub const DEFAULT_COLUMN: &str = "id_number";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Pinned reference year; `None` means read the clock per validation
    pub reference_year: Option<i32>,

    /// CSV column holding identity numbers in batch mode
    pub id_column: String,

    /// Bind address for the API server
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reference_year: None,
            id_column: DEFAULT_COLUMN.to_string(),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (env, test maps)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = non_empty(lookup(ENV_REFERENCE_YEAR)) {
            config.reference_year = Some(
                parse_reference_year(&raw)
                    .with_context(|| format!("Invalid {}: {:?}", ENV_REFERENCE_YEAR, raw))?,
            );
        }

        if let Some(column) = non_empty(lookup(ENV_COLUMN)) {
            config.id_column = column;
        }

        if let Some(addr) = non_empty(lookup(ENV_SERVER_ADDR)) {
            config.server_addr = addr;
        }

        Ok(config)
    }
}

/// Accepts a full year (2026) or two digits (26)
pub fn parse_reference_year(raw: &str) -> Result<i32> {
    let year: i32 = raw
        .trim()
        .parse()
        .with_context(|| format!("Reference year is not a number: {:?}", raw))?;

    check_reference_year(year)
}

/// Range gate shared by config, CLI flags and API requests
pub fn check_reference_year(year: i32) -> Result<i32> {
    if !(0..=9999).contains(&year) {
        bail!("Reference year out of range: {}", year);
    }

    Ok(year)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// TESTS
// ============================================================================
