//! # Field-Key Table
//!
//! Names of the top-level strain keys the validation pipeline reads.
//!
//! The table is an ordinary immutable value: the schema builder, the
//! cross-field rules, and the repository resolver all receive it as an
//! argument. Tests inject their own tables; the CLI loads overrides from a
//! YAML file passed with `--keys`.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KeysError;

/// Default pattern for downloadable-package declarations.
pub const DEFAULT_PACKAGE_PATTERN: &str = "^PICASSO_.+_DPKG$";

/// Top-level configuration keys consulted during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrainKeys {
    /// Platform version, `v<major>.<minor>.<patch>`.
    pub platform_version: String,
    /// Regex matched against every top-level key; matches are package
    /// declarations with `name`, `repo`, and `version` sub-fields.
    pub package_pattern: String,
    /// List of theme declarations.
    pub themes: String,
    /// List of theme names to enable.
    pub themes_name: String,
    /// List of theme directories.
    pub theme_dirs: String,
    /// Single default theme name.
    pub default_theme: String,
    /// Base URL of the platform repository.
    pub platform_repository: String,
    /// Ref (tag, branch, commit) of the platform repository.
    pub platform_ref: String,
    /// Extra pip requirement strings.
    pub pip_requirements: String,
}

impl Default for StrainKeys {
    fn default() -> Self {
        Self {
            platform_version: "TUTOR_VERSION".to_string(),
            package_pattern: DEFAULT_PACKAGE_PATTERN.to_string(),
            themes: "PICASSO_THEMES".to_string(),
            themes_name: "PICASSO_THEMES_NAME".to_string(),
            theme_dirs: "PICASSO_THEME_DIRS".to_string(),
            default_theme: "PICASSO_DEFAULT_SITE_THEME".to_string(),
            platform_repository: "EDX_PLATFORM_REPOSITORY".to_string(),
            platform_ref: "EDX_PLATFORM_VERSION".to_string(),
            pip_requirements: "OPENEDX_EXTRA_PIP_REQUIREMENTS".to_string(),
        }
    }
}

impl StrainKeys {
    /// Load a key table from a YAML overrides file.
    ///
    /// Keys omitted from the file keep their defaults. Unknown keys are
    /// rejected so that a typo does not silently fall back to a default.
    ///
    /// # Errors
    ///
    /// Returns [`KeysError`] if the file cannot be read, does not
    /// deserialize, or carries a package pattern that does not compile.
    pub fn from_file(path: &Path) -> Result<Self, KeysError> {
        let content = std::fs::read_to_string(path).map_err(|source| KeysError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let keys: Self = serde_yaml::from_str(&content).map_err(|source| KeysError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        keys.package_regex()?;
        Ok(keys)
    }

    /// Compile the package key pattern.
    ///
    /// # Errors
    ///
    /// Returns [`KeysError::Pattern`] if the pattern is not a valid regex.
    pub fn package_regex(&self) -> Result<Regex, KeysError> {
        Regex::new(&self.package_pattern).map_err(|source| KeysError::Pattern {
            pattern: self.package_pattern.clone(),
            source,
        })
    }
}
