//! # strain-repo: Repository References and Reachability
//!
//! Strains point at source repositories in two places: the platform
//! repository (a base URL plus a ref) and git-based pip requirements
//! (`git+<url>@<ref>#egg=...`). Before an image build starts, every one of
//! them must resolve to a browsable URL that answers an HTTP GET.
//!
//! - [`resolve`] turns strain fields into [`RepositoryReference`]s.
//! - [`probe`] issues one bounded GET per reference and converts the
//!   outcome into a [`Verdict`](strain_core::Verdict). Probe failures never
//!   propagate as errors.
//! - [`config`] holds the timeout and retry settings.
//!
//! Probes run sequentially, in resolution order: platform repository first,
//! then requirements in list order.

pub mod config;
pub mod error;
pub mod probe;
pub(crate) mod retry;
pub mod resolve;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use probe::ReachabilityChecker;
pub use resolve::{
    parse_git_requirement, resolve_all, resolve_pip_requirements, resolve_platform,
    ReferenceOrigin, RepositoryReference,
};
