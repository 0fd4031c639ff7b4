// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use sa_id_validator::batch::{validate_csv_file, write_rejections_file};
use sa_id_validator::checksum;
use sa_id_validator::config::parse_reference_year;
use sa_id_validator::date_resolver::{current_reference_year, resolve_full_year};
use sa_id_validator::{Config, IdentityNumber, Validator};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  sa-id check <ID>... [--year YYYY] [--json]
  sa-id explain <ID> [--year YYYY]
  sa-id batch <file.csv> [--column NAME] [--errors OUT.csv] [--year YYYY]
  sa-id [ui] [--year YYYY]
  sa-id help | --help | -h";

/// Flags shared by every command
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    reference_year: Option<i32>,
    column: Option<String>,
    errors: Option<PathBuf>,
    json: bool,
    help: bool,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--year" => {
                let value = iter.next().context("--year needs a value")?;
                options.reference_year = Some(parse_reference_year(value)?);
            }
            "--column" => {
                options.column = Some(iter.next().context("--column needs a value")?.clone());
            }
            "--errors" => {
                options.errors = Some(PathBuf::from(iter.next().context("--errors needs a path")?));
            }
            "--json" => options.json = true,
            "--help" | "-h" => options.help = true,
            flag if flag.starts_with("--") => bail!("Unknown flag: {}\n\n{}", flag, USAGE),
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(all_valid) => {
            if all_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Ok(false) when something was checked and found invalid
fn run() -> Result<bool> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env()?;

    let (command, rest) = split_command(&args);

    let options = parse_options(rest)?;
    if options.help {
        println!("{}", USAGE);
        return Ok(true);
    }
    let validator = Validator::from_optional(options.reference_year.or(config.reference_year));

    match command {
        "check" => run_check(&validator, &options),
        "explain" => run_explain(&validator, &options),
        "batch" => run_batch(&validator, &options, &config),
        "ui" => run_ui_mode(validator),
        "help" | "-h" => {
            println!("{}", USAGE);
            Ok(true)
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

/// First argument names the command unless it is a flag; no command means UI
fn split_command(args: &[String]) -> (&str, &[String]) {
    match args.split_first() {
        Some((first, rest)) if first == "--help" => ("help", rest),
        Some((first, rest)) if !first.starts_with("--") => (first.as_str(), rest),
        _ => ("ui", args),
    }
}

fn run_check(validator: &Validator, options: &Options) -> Result<bool> {
    if options.positional.is_empty() {
        bail!("check needs at least one ID number\n\n{}", USAGE);
    }

    let mut all_valid = true;

    for raw in &options.positional {
        let verdict = validator.validate(raw.trim());
        all_valid &= verdict.is_valid();

        if options.json {
            println!(
                "{}",
                serde_json::json!({ "id_number": raw, "verdict": verdict })
            );
        } else {
            let mark = if verdict.is_valid() { "✓" } else { "✗" };
            println!("{} {}  {}", mark, raw, verdict.summary());
        }
    }

    Ok(all_valid)
}

fn run_explain(validator: &Validator, options: &Options) -> Result<bool> {
    let raw = match options.positional.as_slice() {
        [raw] => raw.trim(),
        _ => bail!("explain takes exactly one ID number\n\n{}", USAGE),
    };

    let reference_year = validator
        .reference_year()
        .unwrap_or_else(current_reference_year);
    let verdict = validator.validate(raw);

    println!("🪪  {}", raw);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match IdentityNumber::parse(raw) {
        Err(e) => println!("Format:        ✗ {}", e),
        Ok(id) => {
            let fields = id.decode();
            let report = checksum::evaluate(&id);

            println!("Format:        ✓ 13 digits");
            println!(
                "Birth date:    {:02}/{:02}/{:02} (YY/MM/DD)",
                fields.year_digits, fields.month, fields.day
            );
            println!(
                "Century:       {} (reference year {})",
                resolve_full_year(fields.year_digits, reference_year),
                reference_year
            );
            println!("Gender digit:  {}", fields.gender_digit);
            println!("Sequence:      {:05}", fields.sequence);
            println!(
                "Checksum:      sum {} → expected check digit {}, found {}",
                report.sum, report.expected, report.actual
            );
        }
    }

    println!("\nVerdict:       {}", verdict.summary());
    Ok(verdict.is_valid())
}

fn run_batch(validator: &Validator, options: &Options, config: &Config) -> Result<bool> {
    let path = match options.positional.as_slice() {
        [path] => PathBuf::from(path),
        _ => bail!("batch takes exactly one CSV file\n\n{}", USAGE),
    };
    let column = options.column.as_deref().unwrap_or(&config.id_column);

    println!("📂 Validating {:?} (column {:?})...", path, column);
    let report = validate_csv_file(&path, column, validator)?;
    println!("✓ {}", report.summary.summary());

    if let Some(errors_path) = &options.errors {
        let written = write_rejections_file(&report, errors_path)?;
        println!("✓ Wrote {} rejected rows to {:?}", written, errors_path);
    }

    Ok(report.summary.rejected() == 0)
}

#[cfg(feature = "tui")]
fn run_ui_mode(validator: Validator) -> Result<bool> {
    let mut app = ui::App::new(validator);
    ui::run_ui(&mut app)?;
    Ok(true)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_validator: Validator) -> Result<bool> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: sa-id check <ID>");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&strings(&[
            "8001015009087",
            "--year",
            "2025",
            "--json",
            "9202204720083",
        ]))
        .unwrap();

        assert_eq!(options.positional, vec!["8001015009087", "9202204720083"]);
        assert_eq!(options.reference_year, Some(2025));
        assert!(options.json);
    }

    #[test]
    fn test_parse_options_batch_flags() {
        let options = parse_options(&strings(&[
            "members.csv",
            "--column",
            "ID No",
            "--errors",
            "errors.csv",
        ]))
        .unwrap();

        assert_eq!(options.column.as_deref(), Some("ID No"));
        assert_eq!(options.errors, Some(PathBuf::from("errors.csv")));
    }

    #[test]
    fn test_parse_options_rejects_unknown_and_missing_values() {
        assert!(parse_options(&strings(&["--verbose"])).is_err());
        assert!(parse_options(&strings(&["--year"])).is_err());
        assert!(parse_options(&strings(&["--year", "soon"])).is_err());
    }

    #[test]
    fn test_help_flag_is_not_an_unknown_flag() {
        let args = strings(&["--help"]);
        assert_eq!(split_command(&args).0, "help");

        let args = strings(&["-h"]);
        assert_eq!(split_command(&args).0, "-h");

        let args = strings(&["check", "--help"]);
        let (command, rest) = split_command(&args);
        assert_eq!(command, "check");
        assert!(parse_options(rest).unwrap().help);
    }

    #[test]
    fn test_no_command_or_leading_flag_means_ui() {
        assert_eq!(split_command(&[]).0, "ui");
        let args = strings(&["--year", "2025"]);
        let (command, rest) = split_command(&args);
        assert_eq!(command, "ui");
        assert_eq!(parse_options(rest).unwrap().reference_year, Some(2025));
    }

    #[test]
    fn test_check_reports_invalid() {
        let validator = Validator::with_reference_year(2026);
        let options = parse_options(&strings(&["8001015009087"])).unwrap();
        assert!(run_check(&validator, &options).unwrap());

        let options = parse_options(&strings(&["8001015009087", "8001015009088"])).unwrap();
        assert!(!run_check(&validator, &options).unwrap());
    }
}
