//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Diff lines go to stdout uncolored; everything else goes to stderr.

use std::io::{self, Write};

use colored::Colorize;

use crate::application::services::{DatasetOutcome, DiffReport};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Write the report: diff lines to `out`, missing datasets and failures to stderr.
///
/// Returns the I/O error of `out`, if any (e.g. a closed pipe).
pub fn report(out: &mut impl Write, report: &DiffReport, report_missing: bool) -> io::Result<()> {
    for outcome in &report.outcomes {
        match outcome {
            DatasetOutcome::Differs(result) => writeln!(out, "{result}")?,
            DatasetOutcome::Missing { path, side } if report_missing => {
                warning(&format!("dataset {path} missing in {side}"))
            }
            DatasetOutcome::Failed(e) => error(e),
            DatasetOutcome::Missing { .. } | DatasetOutcome::Within { .. } => {}
        }
    }
    out.flush()
}

/// Print plain output (no color, for data like the effective config)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
