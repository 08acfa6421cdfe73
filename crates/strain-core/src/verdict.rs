//! # Verdicts
//!
//! The result of one check, and the aggregate of a whole run. A run passes
//! only if every verdict in it passes.

use std::fmt;

use serde::Serialize;

/// The family a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Structural schema and cross-field rules.
    Fields,
    /// Reachability of one repository reference.
    Repository,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields => f.write_str("fields"),
            Self::Repository => f.write_str("repository"),
        }
    }
}

/// Pass/fail outcome of a single check, with diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Which check produced this verdict.
    pub check: CheckKind,
    /// What was checked: a document origin or a URL.
    pub subject: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable explanation; empty for a clean pass.
    pub diagnostics: Vec<String>,
}

impl Verdict {
    /// A passing verdict.
    pub fn pass(check: CheckKind, subject: impl Into<String>) -> Self {
        Self {
            check,
            subject: subject.into(),
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    /// A failing verdict. An empty diagnostics list still fails.
    pub fn fail(check: CheckKind, subject: impl Into<String>, diagnostics: Vec<String>) -> Self {
        Self {
            check,
            subject: subject.into(),
            passed: false,
            diagnostics,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "OK" } else { "FAIL" };
        write!(f, "{status}: [{}] {}", self.check, self.subject)?;
        for line in &self.diagnostics {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

/// All verdicts from one validation run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    verdicts: Vec<Verdict>,
    advisories: Vec<String>,
}

impl ValidationReport {
    /// An empty report. It passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one verdict.
    pub fn push(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    /// Append verdicts in order.
    pub fn extend(&mut self, verdicts: impl IntoIterator<Item = Verdict>) {
        self.verdicts.extend(verdicts);
    }

    /// Record a note that does not affect the outcome.
    pub fn advise(&mut self, note: impl Into<String>) {
        self.advisories.push(note.into());
    }

    /// Logical AND of every verdict.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    /// Every verdict, in execution order.
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Failing verdicts only.
    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed)
    }

    /// Advisory notes.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    /// Process exit code for this report: 0 on pass, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}
