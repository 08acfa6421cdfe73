//! # Scan-Log Subcommand
//!
//! Flags known error and warning text in a build log.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use strain_build::{LogScanner, ScanReport, Severity};

/// Arguments for `strain scan-log`.
#[derive(Args, Debug)]
pub struct ScanLogArgs {
    /// Build log file.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Treat warnings as failures.
    #[arg(long)]
    pub fail_on_warnings: bool,
}

/// Execute the scan-log subcommand.
///
/// Returns exit code: 1 if an error finding exists (or any finding, with
/// `--fail-on-warnings`), 0 otherwise.
pub fn run_scan_log(args: &ScanLogArgs, scanner: &LogScanner) -> Result<u8> {
    let report = scanner.scan_file(&args.path)?;

    for finding in &report.findings {
        println!("{finding}");
    }

    let code = exit_code(&report, args.fail_on_warnings);
    let errors = report.by_severity(Severity::Error).count();
    let warnings = report.by_severity(Severity::Warning).count();
    if code == 0 {
        tracing::info!(path = %args.path.display(), warnings, "build log is clean");
    } else {
        tracing::error!(path = %args.path.display(), errors, warnings, "build log has failures");
    }
    Ok(code)
}

fn exit_code(report: &ScanReport, fail_on_warnings: bool) -> u8 {
    let failing = report.has_errors() || (fail_on_warnings && !report.findings.is_empty());
    u8::from(failing)
}
