//! Repeats a repository request after transport failures.
//!
//! A reply of any status ends the loop; the prober decides what the status
//! means. Waits grow geometrically from [`FIRST_WAIT`] up to [`MAX_WAIT`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

const FIRST_WAIT: Duration = Duration::from_millis(200);
const MAX_WAIT: Duration = Duration::from_secs(5);

/// Wait before the given follow-up attempt (1 for the first repeat).
pub(crate) fn wait_before(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    FIRST_WAIT.saturating_mul(factor).min(MAX_WAIT)
}

/// Run `send` once, then up to `repeats` more times while it fails.
///
/// The last failure is returned unchanged when every attempt fails.
pub(crate) async fn send_with_repeats<T, E, F, Fut>(repeats: u32, mut send: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Ok(reply) => return Ok(reply),
            Err(e) if attempt < repeats => {
                attempt += 1;
                let wait = wait_before(attempt);
                tracing::debug!(
                    attempt,
                    repeats,
                    wait_ms = wait.as_millis() as u64,
                    "repository unreachable ({e}); trying again"
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}
