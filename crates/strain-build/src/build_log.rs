//! # Build-Log Scanning
//!
//! Docker builds often exit zero while a step inside them failed quietly,
//! e.g. a theme that was never cloned or a settings module that raised. The
//! scanner flags log lines matching known error or warning patterns so CI
//! can stop before publishing an unusable image.
//!
//! Patterns are regular expressions searched anywhere in the line. Warning
//! patterns are tried first: a line that matches one is a warning even if
//! an error pattern also matches it (`Error: No such command 'init'` is
//! expected noise, not a failure).

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::error::BuildError;

/// Patterns that mark a build step as failed.
pub const DEFAULT_ERROR_PATTERNS: &[&str] = &[
    "^Error",
    "ValueError",
    "Theme not found",
    "ERROR: Repository not found",
];

/// Patterns worth surfacing but not fatal.
pub const DEFAULT_WARNING_PATTERNS: &[&str] = &[
    r"fatal: not a git repository \(or any of the parent directories\): \.git",
    r"Error: No such command 'init'",
];

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One flagged log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based line number.
    pub line_number: usize,
    pub severity: Severity,
    /// The pattern that matched.
    pub pattern: String,
    /// The full line, trimmed of trailing whitespace.
    pub line: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} [{}]: {}", self.line_number, self.severity, self.line)
    }
}

/// All findings from one log.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
}

impl ScanReport {
    /// Whether any error-severity finding exists.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// The first error, where the build should be considered broken.
    pub fn first_error(&self) -> Option<&Finding> {
        self.findings.iter().find(|f| f.severity == Severity::Error)
    }

    /// Findings of one severity.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }
}

/// Regex scanner over build output.
#[derive(Debug, Clone)]
pub struct LogScanner {
    errors: Vec<Regex>,
    warnings: Vec<Regex>,
}

impl LogScanner {
    /// A scanner with explicit pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Pattern`] for the first pattern that does not
    /// compile.
    pub fn new(errors: &[&str], warnings: &[&str]) -> Result<Self, BuildError> {
        Ok(Self {
            errors: compile(errors)?,
            warnings: compile(warnings)?,
        })
    }

    /// A scanner with [`DEFAULT_ERROR_PATTERNS`] and
    /// [`DEFAULT_WARNING_PATTERNS`].
    ///
    /// # Errors
    ///
    /// See [`LogScanner::new`].
    pub fn standard() -> Result<Self, BuildError> {
        Self::new(DEFAULT_ERROR_PATTERNS, DEFAULT_WARNING_PATTERNS)
    }

    /// Scan log text.
    pub fn scan(&self, log: &str) -> ScanReport {
        let findings = log
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let (severity, pattern) = first_match(&self.warnings, line)
                    .map(|p| (Severity::Warning, p))
                    .or_else(|| first_match(&self.errors, line).map(|p| (Severity::Error, p)))?;
                Some(Finding {
                    line_number: i + 1,
                    severity,
                    pattern: pattern.to_string(),
                    line: line.trim_end().to_string(),
                })
            })
            .collect();
        ScanReport { findings }
    }

    /// Read and scan a log file. Invalid UTF-8 is replaced, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the file cannot be read.
    pub fn scan_file(&self, path: &Path) -> Result<ScanReport, BuildError> {
        let bytes = std::fs::read(path).map_err(|source| BuildError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(self.scan(&String::from_utf8_lossy(&bytes)))
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>, BuildError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| BuildError::Pattern {
                pattern: (*p).to_string(),
                source,
            })
        })
        .collect()
}

fn first_match<'a>(patterns: &'a [Regex], line: &str) -> Option<&'a str> {
    patterns
        .iter()
        .find(|re| re.is_match(line))
        .map(Regex::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> LogScanner {
        LogScanner::standard().unwrap()
    }

    #[test]
    fn default_patterns_compile() {
        assert!(LogScanner::standard().is_ok());
    }

    #[test]
    fn classifies_known_build_failures() {
        let log = "\
Theme not found in /openedx/themes: bragi
ValueError: Unable to configure handler 'tracking'
fatal: not a git repository (or any of the parent directories): .git
Error: No such command 'init'.
";
        let report = scanner().scan(log);
        let found: Vec<(usize, Severity)> = report
            .findings
            .iter()
            .map(|f| (f.line_number, f.severity))
            .collect();
        assert_eq!(
            found,
            [
                (1, Severity::Error),
                (2, Severity::Error),
                (3, Severity::Warning),
                (4, Severity::Warning),
            ]
        );
        assert_eq!(report.first_error().map(|f| f.line_number), Some(1));
    }

    #[test]
    fn error_prefix_is_anchored_to_line_start() {
        let report = scanner().scan("Error: could not compile assets\n#5 0.1 no Error here\n");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].line_number, 1);
        assert_eq!(report.findings[0].pattern, "^Error");
    }

    #[test]
    fn missing_repository_is_an_error() {
        let report = scanner().scan("#9 1.2 ERROR: Repository not found.\n");
        assert!(report.has_errors());
    }

    #[test]
    fn clean_log_has_no_findings() {
        let report = scanner().scan("#1 DONE 0.1s\n#2 DONE 3.0s\n");
        assert!(report.findings.is_empty());
        assert!(!report.has_errors());
        assert!(report.first_error().is_none());
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let report = scanner().scan("Error: No such command 'init'.\n");
        assert!(!report.has_errors());
        assert_eq!(report.by_severity(Severity::Warning).count(), 1);
    }

    #[test]
    fn custom_patterns() {
        let scanner = LogScanner::new(&["boom$"], &[]).unwrap();
        let report = scanner.scan("ValueError: ignored\nboom\nboom later\n");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].line_number, 2);
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = LogScanner::new(&["("], &[]).unwrap_err();
        assert!(matches!(err, BuildError::Pattern { .. }), "got: {err}");
    }

    #[test]
    fn scan_file_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.log");
        std::fs::write(&path, b"ok \xff\nTheme not found: bragi\n").unwrap();

        let report = scanner().scan_file(&path).unwrap();
        assert!(report.has_errors());
        assert_eq!(
            report.findings[0].to_string(),
            "line 2 [error]: Theme not found: bragi"
        );
    }
}
