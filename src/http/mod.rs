// Shared blocking HTTP plumbing for the service clients


use anyhow::Result;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Build an agent with a global per-request timeout
#[inline]
pub fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Run `request_fn` up to `attempts` times, at least once.
/// 5xx responses and transport failures are retried with exponential backoff;
/// any other error fails immediately.
#[inline]
pub fn send_with_retry<F>(target: &str, attempts: u32, mut request_fn: F) -> Result<String>
where
    F: FnMut() -> Result<String, ureq::Error>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!("Request to {} (attempt {}/{})", target, attempt, attempts);

        let error = match request_fn() {
            Ok(body) => return Ok(body),
            Err(error) => error,
        };
        let message = describe(&error);

        if !is_retryable(&error) {
            warn!("Request to {} failed: {}", target, message);
            return Err(anyhow::anyhow!(message));
        }
        if attempt >= attempts {
            error!("Request to {} failed after {} attempts: {}", target, attempts, message);
            return Err(anyhow::anyhow!(message));
        }

        let delay = backoff(attempt);
        warn!("{} from {}, retrying in {:?}", message, target, delay);
        std::thread::sleep(delay);
        attempt += 1;
    }
}

fn is_retryable(error: &ureq::Error) -> bool {
    match error {
        ureq::Error::StatusCode(status) => *status >= 500,
        ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound
        | ureq::Error::Timeout(_)
        | ureq::Error::Io(_) => true,
        _ => false,
    }
}

fn describe(error: &ureq::Error) -> String {
    match error {
        ureq::Error::StatusCode(status) => format!("HTTP {}", status),
        other => format!("Transport error: {}", other),
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(1000 * EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1))
}
