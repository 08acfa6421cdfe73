//! # Validate Subcommands
//!
//! Orchestrates validation of one strain file.
//!
//! 1. Load and parse the file. A parse error aborts the run; nothing else
//!    is checked.
//! 2. Field validation: schema plus cross-field rules, one verdict.
//! 3. Repository validation: one verdict per resolved reference, probed in
//!    order. Every unreachable reference is reported, not just the first.
//!
//! The run passes only if every verdict in its check set passes.
//! `validate-fields` and `validate-repos` run one family each with the same
//! aggregation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use strain_core::{StrainDocument, StrainKeys, ValidationReport};
use strain_repo::{resolve_all, ProbeConfig, ReachabilityChecker};
use strain_schema::SchemaValidator;

/// Arguments shared by the validate subcommands.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Strain configuration file.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Which check families a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSet {
    /// Schema and cross-field rules only.
    Fields,
    /// Repository reachability only.
    Repositories,
    /// Both families.
    All,
}

impl CheckSet {
    fn fields(self) -> bool {
        matches!(self, Self::Fields | Self::All)
    }

    fn repositories(self) -> bool {
        matches!(self, Self::Repositories | Self::All)
    }
}

/// Run the configured checks against the strain at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or parsed, or if a
/// validator cannot be constructed. Failing checks are not errors; they are
/// failing verdicts in the returned report.
pub async fn run_validation(
    path: &Path,
    checks: CheckSet,
    keys: &StrainKeys,
    probe: &ProbeConfig,
) -> Result<ValidationReport> {
    let doc = StrainDocument::load(path)?;
    tracing::debug!(path = %path.display(), ?checks, "strain loaded");

    let mut report = ValidationReport::new();

    if checks.fields() {
        let validator = SchemaValidator::new(keys).context("failed to build strain schema")?;
        let fields = validator.validate(&doc);
        for note in fields.advisories() {
            report.advise(note.clone());
        }
        report.push(fields.to_verdict(doc.origin()));
    }

    if checks.repositories() {
        let references = resolve_all(&doc, keys);
        tracing::info!(count = references.len(), "probing repository references");
        let checker =
            ReachabilityChecker::new(probe.clone()).context("failed to build HTTP client")?;
        report.extend(checker.check_all(&references).await);
    }

    Ok(report)
}

/// Execute a validate subcommand.
///
/// Returns exit code: 0 if every check passed, 1 otherwise.
pub async fn run_validate(
    args: &ValidateArgs,
    checks: CheckSet,
    keys: &StrainKeys,
    probe: &ProbeConfig,
) -> Result<u8> {
    let report = run_validation(&args.path, checks, keys, probe)
        .await
        .with_context(|| format!("cannot validate {}", args.path.display()))?;
    print_report(&report, &args.path);
    Ok(report.exit_code())
}

fn print_report(report: &ValidationReport, path: &Path) {
    for note in report.advisories() {
        tracing::warn!("{note}");
    }

    for verdict in report.verdicts() {
        println!("{verdict}");
    }

    let total = report.verdicts().len();
    let failed = report.failures().count();
    if failed == 0 {
        tracing::info!(path = %path.display(), total, "all checks passed");
        println!("\nAll {total} check(s) passed for {}.", path.display());
    } else {
        for verdict in report.failures() {
            tracing::error!(
                check = %verdict.check,
                subject = %verdict.subject,
                "{}",
                verdict.diagnostics.join("; ")
            );
        }
        println!(
            "\n{failed} of {total} check(s) failed for {}.",
            path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use strain_core::{CheckKind, StrainError};

    fn write_strain(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("config.yml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    fn fast_probe() -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_millis(500),
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn parse_error_aborts_before_any_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_strain(&dir, "TUTOR_VERSION: [v1.0.0\n");

        let err = run_validation(&path, CheckSet::All, &StrainKeys::default(), &fast_probe())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StrainError>(),
            Some(StrainError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let args = ValidateArgs {
            path: PathBuf::from("/nonexistent/strain/config.yml"),
        };
        let err = run_validate(&args, CheckSet::Fields, &StrainKeys::default(), &fast_probe())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/strain/config.yml"));
    }

    #[tokio::test]
    async fn fields_only_skips_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_strain(
            &dir,
            "TUTOR_VERSION: v15.3.0\nEDX_PLATFORM_REPOSITORY: http://127.0.0.1:1/x.git\n",
        );

        let report = run_validation(&path, CheckSet::Fields, &StrainKeys::default(), &fast_probe())
            .await
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.verdicts().len(), 1);
        assert_eq!(report.verdicts()[0].check, CheckKind::Fields);
        assert_eq!(report.advisories().len(), 2);
    }

    #[tokio::test]
    async fn schema_failure_fails_fields_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_strain(&dir, "TUTOR_VERSION: \"5.3.0\"\n");

        let args = ValidateArgs { path };
        let code = run_validate(&args, CheckSet::Fields, &StrainKeys::default(), &fast_probe())
            .await
            .unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn repositories_only_skips_schema() {
        let dir = tempfile::tempdir().unwrap();
        // Invalid version, but only repositories are checked.
        let path = write_strain(
            &dir,
            "TUTOR_VERSION: latest\nEDX_PLATFORM_REPOSITORY: http://127.0.0.1:1/org/platform.git\nEDX_PLATFORM_VERSION: v1\n",
        );

        let report = run_validation(
            &path,
            CheckSet::Repositories,
            &StrainKeys::default(),
            &fast_probe(),
        )
        .await
        .unwrap();
        assert!(report
            .verdicts()
            .iter()
            .all(|v| v.check == CheckKind::Repository));
        assert_eq!(report.verdicts().len(), 1);
        assert!(!report.passed());
        assert_eq!(
            report.verdicts()[0].subject,
            "http://127.0.0.1:1/org/platform/tree/v1"
        );
    }

    #[tokio::test]
    async fn missing_platform_fields_fail_reachability() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_strain(&dir, "TUTOR_VERSION: v15.3.0\n");

        let report = run_validation(
            &path,
            CheckSet::Repositories,
            &StrainKeys::default(),
            &fast_probe(),
        )
        .await
        .unwrap();
        assert!(!report.passed());
        assert_eq!(report.verdicts()[0].subject, "/tree/");
    }

    #[test]
    fn check_set_membership() {
        assert!(CheckSet::All.fields() && CheckSet::All.repositories());
        assert!(CheckSet::Fields.fields() && !CheckSet::Fields.repositories());
        assert!(!CheckSet::Repositories.fields() && CheckSet::Repositories.repositories());
    }
}
