//! Probe configuration.
//!
//! Defaults match the CI contract: a five second timeout and no retries, so
//! a transient failure is reported exactly like a permanent one. Override
//! via environment variables or explicit construction for testing.

use std::time::Duration;

/// Upper bound on retries, whatever the environment asks for.
pub const MAX_RETRIES: u32 = 5;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for the reachability checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Per-request timeout, covering connect through response headers.
    pub timeout: Duration,
    /// Extra attempts after a transport error. Status errors never retry.
    pub retries: u32,
    /// `User-Agent` header sent with every probe.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            user_agent: concat!("strain-validator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `STRAIN_PROBE_TIMEOUT_SECS` (default: 5)
    /// - `STRAIN_PROBE_RETRIES` (default: 0, capped at [`MAX_RETRIES`])
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_parse::<u64>("STRAIN_PROBE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retries: env_parse::<u32>("STRAIN_PROBE_RETRIES")
                .unwrap_or(defaults.retries)
                .min(MAX_RETRIES),
            user_agent: defaults.user_agent,
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}
