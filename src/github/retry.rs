//! Exponential backoff for transient GitHub API failures.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::GitHubError;

/// How often and how patiently to retry a failing request.
///
/// Default: 3 total attempts, base 1s, max 30s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Retry an async GitHub operation with exponential backoff.
///
/// Only transient errors (see [`GitHubError::is_transient`]) are retried.
/// Rate limiting and missing repositories are returned immediately. When the
/// attempts run out the last error is wrapped in `RetriesExhausted`.
pub async fn retry_with_backoff<T, Fut, F>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, GitHubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubError>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: policy.initial_interval,
        max_interval: policy.max_interval,
        max_elapsed_time: None,
        ..Default::default()
    };

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                if attempts >= max_attempts {
                    return Err(GitHubError::RetriesExhausted(Box::new(e)));
                }

                let wait = backoff.next_backoff().unwrap_or(policy.max_interval);
                warn!(
                    attempt = attempts,
                    "GitHub request failed: {}. Retrying in {:?}",
                    e, wait
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}
