//! Capped, constant-delay retry for rate-limited calls.

use crate::traits::LlmError;
use std::future::Future;
use std::time::Duration;

/// How rate-limit failures are retried: a fixed number of attempts with a
/// constant delay between them. Backoff is deliberately not exponential.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

/// Run `op`, retrying only on [`LlmError::RateLimit`].
///
/// Any other error aborts immediately. Once the attempt cap is hit the
/// rate limit is reported as [`LlmError::RetriesExhausted`] so callers can
/// tell an abandoned retry loop from a first-try failure.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(LlmError::RateLimit) if attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_secs = policy.delay.as_secs(),
                    "rate limited; sleeping before retry"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(LlmError::RateLimit) => {
                tracing::error!(attempts = attempt, "rate limit retries exhausted");
                return Err(LlmError::RetriesExhausted { attempts: attempt });
            }
            Err(e) => return Err(e),
        }
    }
}
