//! # Repository Reachability Checker
//!
//! One HTTP GET per repository reference, bounded by the configured timeout.
//!
//! | Outcome | Verdict |
//! |---|---|
//! | 2xx, or 3xx that was not followed | pass |
//! | 4xx / 5xx | fail, with the status |
//! | timeout, DNS, refused connection, TLS | fail, with the transport error |
//! | URL that does not parse as absolute http(s) | fail, with the parse error |
//!
//! Redirects are followed (up to reqwest's default limit), so a 3xx normally
//! resolves to the status of its target.

use url::Url;

use strain_core::{CheckKind, Verdict};

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::resolve::RepositoryReference;

/// Issues reachability probes.
#[derive(Debug, Clone)]
pub struct ReachabilityChecker {
    http: reqwest::Client,
    config: ProbeConfig,
}

impl ReachabilityChecker {
    /// Build a checker with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] if the TLS backend cannot initialize.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ProbeError::Client)?;
        Ok(Self { http, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// GET `url` and return the final status code if it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] describing why the URL is not reachable.
    pub async fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let resp = crate::retry::send_with_repeats(self.config.retries, || {
            self.http.get(parsed.clone()).send()
        })
        .await
        .map_err(|source| ProbeError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ProbeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }

    /// Probe one reference and convert the outcome into a verdict.
    pub async fn check(&self, reference: &RepositoryReference) -> Verdict {
        let url = reference.browse_url();
        match self.probe(&url).await {
            Ok(status) => {
                tracing::info!(%url, status, origin = %reference.origin, "repository reachable");
                Verdict::pass(CheckKind::Repository, url)
            }
            Err(e) => {
                let cause = e.chain();
                tracing::warn!(%url, origin = %reference.origin, error = %cause, "repository unreachable");
                Verdict::fail(
                    CheckKind::Repository,
                    url,
                    vec![
                        format!("{} declared as '{}'", reference.origin, reference.declared),
                        cause,
                    ],
                )
            }
        }
    }

    /// Probe references one after another, reporting every failure.
    pub async fn check_all(&self, references: &[RepositoryReference]) -> Vec<Verdict> {
        let mut verdicts = Vec::with_capacity(references.len());
        for reference in references {
            verdicts.push(self.check(reference).await);
        }
        verdicts
    }
}
