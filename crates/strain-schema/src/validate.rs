//! # Schema Validation
//!
//! Runs the compiled strain schema and the cross-field rules against a
//! parsed document.
//!
//! ## Invariant
//!
//! A document is valid only if both stages report nothing. Violations are
//! collected exhaustively so an operator can fix a strain in one pass; the
//! pass/fail outcome is the same as stopping at the first one.

use std::fmt;

use jsonschema::Validator;
use thiserror::Error;

use strain_core::{CheckKind, KeysError, StrainDocument, StrainKeys, Verdict};

use crate::rules::RuleSet;
use crate::schema::StrainSchema;

/// Error while preparing the validator. Never raised by validation itself.
#[derive(Error, Debug)]
pub enum SchemaBuildError {
    /// The key table is unusable.
    #[error(transparent)]
    Keys(#[from] KeysError),

    /// The generated schema did not compile.
    #[error("strain schema does not compile: {reason}")]
    Compile {
        /// Compiler message from `jsonschema`.
        reason: String,
    },
}

/// Which stage produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A single field is missing, mistyped, or fails a constraint.
    Structural,
    /// A rule spanning several fields does not hold.
    CrossField,
}

/// A single violation with the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Stage that reported it.
    pub kind: ViolationKind,
    /// JSON Pointer to the offending value, or the trigger key of a rule.
    /// Empty for the document root.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.field.is_empty() {
            "(root)"
        } else {
            &self.field
        };
        match self.kind {
            ViolationKind::Structural => write!(f, "{field}: {}", self.message),
            ViolationKind::CrossField => write!(f, "{field} (cross-field): {}", self.message),
        }
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Default)]
pub struct FieldReport {
    violations: Vec<Violation>,
    advisories: Vec<String>,
}

impl FieldReport {
    /// True if no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations, structural first, then cross-field.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Notes about absent optional fields. They never affect validity.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    /// Collapse into a single verdict for `subject`.
    pub fn to_verdict(&self, subject: &str) -> Verdict {
        if self.is_valid() {
            Verdict::pass(CheckKind::Fields, subject)
        } else {
            Verdict::fail(
                CheckKind::Fields,
                subject,
                self.violations.iter().map(ToString::to_string).collect(),
            )
        }
    }
}

/// Compiled strain validator.
///
/// Build once per key table and reuse across documents.
pub struct SchemaValidator {
    keys: StrainKeys,
    compiled: Validator,
    rules: RuleSet,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("keys", &self.keys)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile the strain schema with the default cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError`] if the package key pattern is not a
    /// valid regex or the schema fails to compile.
    pub fn new(keys: &StrainKeys) -> Result<Self, SchemaBuildError> {
        Self::with_rules(keys, RuleSet::default_rules(keys))
    }

    /// Compile the strain schema with a caller-supplied rule set.
    ///
    /// # Errors
    ///
    /// See [`SchemaValidator::new`].
    pub fn with_rules(keys: &StrainKeys, rules: RuleSet) -> Result<Self, SchemaBuildError> {
        keys.package_regex()?;

        let schema = StrainSchema::build(keys);
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let compiled = opts
            .build(&schema)
            .map_err(|e| SchemaBuildError::Compile {
                reason: e.to_string(),
            })?;

        Ok(Self {
            keys: keys.clone(),
            compiled,
            rules,
        })
    }

    /// The key table this validator was built for.
    pub fn keys(&self) -> &StrainKeys {
        &self.keys
    }

    /// Validate a document against the schema, then the cross-field rules.
    pub fn validate(&self, doc: &StrainDocument) -> FieldReport {
        let instance = doc.to_value();

        let mut violations: Vec<Violation> = self
            .compiled
            .iter_errors(&instance)
            .map(|e| Violation {
                kind: ViolationKind::Structural,
                field: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        violations.extend(self.rules.evaluate(doc));

        FieldReport {
            violations,
            advisories: self.advisories(doc),
        }
    }

    /// Without themes, custom themes are off. Without themes, a names list,
    /// or a default theme, the stock theme is served.
    fn advisories(&self, doc: &StrainDocument) -> Vec<String> {
        let keys = &self.keys;
        let mut notes = Vec::new();
        if doc.contains(&keys.themes) {
            return notes;
        }
        notes.push(format!(
            "{} is not defined; no custom themes will be installed",
            keys.themes
        ));
        if !doc.contains(&keys.themes_name) && !doc.contains(&keys.default_theme) {
            notes.push(format!(
                "{} is not defined; the default theme will be used",
                keys.themes_name
            ));
        }
        notes
    }
}
