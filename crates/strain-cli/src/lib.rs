//! # strain-cli: Strain Toolchain CLI
//!
//! Provides the `strain` command used by the image-build pipeline.
//!
//! ## Subcommands
//!
//! - `strain validate`: field and repository validation.
//! - `strain validate-fields`: field validation only.
//! - `strain validate-repos`: repository reachability only.
//! - `strain image-tag`: generate a dynamic image tag for a service.
//! - `strain target-key`: print the strain key holding a service's image.
//! - `strain config-env`: print `KEY=value` lines for selected strain keys.
//! - `strain config-value`: print a single strain value.
//! - `strain scan-log`: flag known error text in a build log.
//!
//! ```bash
//! strain validate strains/base/config.yml
//! strain image-tag --config-file config.yml --service openedx --env-file "$GITHUB_ENV"
//! strain config-env --config-file config.yml --required-keys TUTOR_VERSION TUTOR_APP_NAME
//! strain scan-log build.log
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; checks live in the domain crates.
//! - Every handler returns an exit code: 0 on success, 1 on any failure.

pub mod config;
pub mod image;
pub mod scan;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use strain_core::StrainKeys;

/// Load the field-key table: the file at `path` if given, else defaults.
///
/// # Errors
///
/// Fails if the overrides file is unreadable or invalid.
pub fn load_keys(path: Option<&Path>) -> Result<StrainKeys> {
    match path {
        Some(p) => StrainKeys::from_file(p)
            .with_context(|| format!("failed to load key table from {}", p.display())),
        None => Ok(StrainKeys::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_keys_defaults_without_path() {
        assert_eq!(load_keys(None).unwrap(), StrainKeys::default());
    }

    #[test]
    fn load_keys_reports_path_on_failure() {
        let err = load_keys(Some(Path::new("/nonexistent/keys.yml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/keys.yml"));
    }
}
