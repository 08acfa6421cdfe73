//! Probe error types.

/// Why a repository URL could not be confirmed reachable.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The resolved URL is not an absolute http(s) URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Timeout, DNS failure, refused connection, TLS failure, redirect loop.
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    /// The server answered with a 4xx or 5xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProbeError {
    /// This error followed by every underlying cause, joined with `: `.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self).and_then(std::error::Error::source);
        while let Some(err) = cause {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}
