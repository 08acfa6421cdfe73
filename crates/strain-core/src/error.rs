//! # Error Types
//!
//! Errors that abort a validation run before any check executes. Everything
//! that happens after the document is loaded is reported through verdicts.

use thiserror::Error;

/// Errors raised while loading a strain document.
#[derive(Error, Debug)]
pub enum StrainError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// Path of the strain file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid YAML, or its root is not a mapping.
    #[error("invalid YAML in '{path}': {reason}")]
    Parse {
        /// Path of the strain file.
        path: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors in the field-key table.
#[derive(Error, Debug)]
pub enum KeysError {
    /// The overrides file could not be read.
    #[error("cannot read keys file '{path}': {source}")]
    Read {
        /// Path of the overrides file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The overrides file is not a valid key table.
    #[error("invalid keys file '{path}': {source}")]
    Parse {
        /// Path of the overrides file.
        path: String,
        /// Deserialization error.
        source: serde_yaml::Error,
    },

    /// The package key pattern does not compile.
    #[error("invalid package key pattern '{pattern}': {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Regex compilation error.
        source: regex::Error,
    },
}
