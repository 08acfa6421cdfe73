#![deny(missing_docs)]

//! # strain-core: Foundational Types for Strain Validation
//!
//! A strain is one deployable variant of the platform, described by a YAML
//! configuration file. This crate holds the types every other crate in the
//! workspace shares. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **The document is read-only.** [`StrainDocument`] is parsed once and
//!    never mutated by validation. Writing values back to a strain file is a
//!    separate concern handled by `strain-build`.
//!
//! 2. **Field names are an explicit value.** Every configuration key the
//!    pipeline reads lives in a [`StrainKeys`] table that callers pass in.
//!    Nothing consults process-wide lookup tables.
//!
//! 3. **Checks produce verdicts, not faults.** A failing check yields a
//!    [`Verdict`] with `passed == false`. Only a malformed document surfaces
//!    as a [`StrainError`].

pub mod document;
pub mod error;
pub mod keys;
pub mod verdict;

pub use document::StrainDocument;
pub use error::{KeysError, StrainError};
pub use keys::StrainKeys;
pub use verdict::{CheckKind, ValidationReport, Verdict};
