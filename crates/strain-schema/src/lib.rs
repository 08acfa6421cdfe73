//! # strain-schema: Structural Validation of Strain Files
//!
//! Validation runs in two independent stages over a parsed
//! [`StrainDocument`](strain_core::StrainDocument):
//!
//! 1. **Per-field shapes** ([`schema`]). A JSON Schema (draft 2020-12) built
//!    from the [`StrainKeys`](strain_core::StrainKeys) table and compiled
//!    once with the `jsonschema` crate. Package declarations are matched by
//!    key pattern through `patternProperties`, so any number of them may
//!    appear. Unknown top-level keys are accepted.
//!
//! 2. **Cross-field rules** ([`rules`]). Predicates that span several
//!    optional fields, e.g. "themes need a name source". They are evaluated
//!    separately so a well-typed document can still be rejected.
//!
//! [`SchemaValidator`] runs both and returns a [`FieldReport`] listing every
//! violation, not just the first.

pub mod rules;
pub mod schema;
pub mod validate;

pub use rules::{CrossFieldRule, RuleSet};
pub use schema::StrainSchema;
pub use validate::{FieldReport, SchemaBuildError, SchemaValidator, Violation, ViolationKind};
