//! # Repository URL Resolution
//!
//! Derives browsable repository URLs from strain fields.
//!
//! | Source | Input | Browsable URL |
//! |---|---|---|
//! | platform | `https://host/org/platform.git` + `v1.0.0` | `https://host/org/platform/tree/v1.0.0` |
//! | pip requirement | `git+https://host/org/repo.git@v1.2.3#egg=pkg` | `https://host/org/repo/tree/v1.2.3` |
//!
//! Missing platform fields resolve to empty strings. The malformed URL that
//! results is handed to the reachability check, which reports it as
//! unreachable; resolution itself never fails.

use std::fmt;

use strain_core::{StrainDocument, StrainKeys};

/// Where a repository reference was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOrigin {
    /// The platform repository fields.
    Platform,
    /// Entry `index` of the extra pip requirements list.
    PipRequirement {
        /// Position in the requirements list.
        index: usize,
    },
}

impl fmt::Display for ReferenceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform repository"),
            Self::PipRequirement { index } => write!(f, "pip requirement #{index}"),
        }
    }
}

/// A repository base URL plus an optional ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    /// Where the reference came from.
    pub origin: ReferenceOrigin,
    /// Repository URL with any trailing `.git` removed.
    pub base_url: String,
    /// Tag, branch, or commit. `None` if the declaration carries no ref.
    pub git_ref: Option<String>,
    /// The declaration as written in the strain.
    pub declared: String,
}

impl RepositoryReference {
    /// The URL a browser (or probe) should open: `<base>/tree/<ref>`.
    pub fn browse_url(&self) -> String {
        match &self.git_ref {
            Some(r) => format!("{}/tree/{r}", self.base_url),
            None => self.base_url.clone(),
        }
    }
}

/// Resolve the platform repository reference.
pub fn resolve_platform(doc: &StrainDocument, keys: &StrainKeys) -> RepositoryReference {
    let url = doc.get_str(&keys.platform_repository).unwrap_or_else(|| {
        tracing::warn!(
            key = %keys.platform_repository,
            "platform repository URL is not set; probing an empty URL"
        );
        ""
    });
    let version = doc.get_str(&keys.platform_ref).unwrap_or_else(|| {
        tracing::warn!(
            key = %keys.platform_ref,
            "platform repository version is not set; probing an empty ref"
        );
        ""
    });

    RepositoryReference {
        origin: ReferenceOrigin::Platform,
        base_url: strip_git_suffix(url.trim_end_matches('/')).to_string(),
        git_ref: Some(version.to_string()),
        declared: format!("{url}@{version}"),
    }
}

/// Resolve every git-based entry of the extra pip requirements list.
///
/// Entries that are not strings or do not contain `git+` are skipped.
pub fn resolve_pip_requirements(
    doc: &StrainDocument,
    keys: &StrainKeys,
) -> Vec<RepositoryReference> {
    let Some(entries) = doc.get(&keys.pip_requirements).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let requirement = entry.as_str()?;
            let (base_url, git_ref) = parse_git_requirement(requirement)?;
            Some(RepositoryReference {
                origin: ReferenceOrigin::PipRequirement { index },
                base_url,
                git_ref,
                declared: requirement.to_string(),
            })
        })
        .collect()
}

/// Platform reference first, then pip requirements in list order.
pub fn resolve_all(doc: &StrainDocument, keys: &StrainKeys) -> Vec<RepositoryReference> {
    let mut refs = vec![resolve_platform(doc, keys)];
    refs.extend(resolve_pip_requirements(doc, keys));
    refs
}

/// Extract `(base_url, ref)` from a pip requirement containing `git+<url>`.
///
/// The URL runs to the first `#`, whitespace, or end of string. Only an `@`
/// inside the URL path separates the ref, so userinfo such as
/// `ssh://git@host/...` is left intact. A trailing `.git` is stripped from
/// the base.
pub fn parse_git_requirement(requirement: &str) -> Option<(String, Option<String>)> {
    let start = requirement.find("git+")? + "git+".len();
    let rest = &requirement[start..];
    let end = rest
        .find(|c: char| c == '#' || c.is_whitespace())
        .unwrap_or(rest.len());
    let target = &rest[..end];
    if target.is_empty() {
        return None;
    }

    let path_start = match target.find("://") {
        Some(scheme_end) => {
            let authority = scheme_end + "://".len();
            target[authority..].find('/').map(|i| authority + i)
        }
        // scp-like `user@host:path`
        None => target.find(':').map(|i| i + 1),
    };

    let ref_at = path_start.and_then(|p| target[p..].find('@').map(|i| p + i));
    let (base, git_ref) = match ref_at {
        Some(at) => (&target[..at], Some(target[at + 1..].to_string())),
        None => (target, None),
    };

    Some((strip_git_suffix(base).to_string(), git_ref))
}

fn strip_git_suffix(url: &str) -> &str {
    url.strip_suffix(".git").unwrap_or(url)
}
