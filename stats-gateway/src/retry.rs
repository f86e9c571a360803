//! Bounded retry with backoff for backend calls.
//!
//! Every attempt runs under its own timeout. An elapsed timeout is reported as
//! [`UpstreamError::Timeout`] and retried like any other transient failure.

use crate::config::{BackoffKind, RetryConfig};
use crate::errors::UpstreamError;
use crate::metrics_defs::{UPSTREAM_ATTEMPTS, UPSTREAM_FAILURES, UPSTREAM_RETRIES};
use shared::counter;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    /// `base * attempt`
    Linear(Duration),
    /// `base * 2^(attempt - 1)`
    Exponential(Duration),
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Linear(base) => base.saturating_mul(attempt),
            Backoff::Exponential(base) => {
                base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig, attempt_timeout: Duration) -> Self {
        let base = Duration::from_millis(config.base_delay_ms);
        let backoff = match config.backoff {
            BackoffKind::Linear => Backoff::Linear(base),
            BackoffKind::Exponential => Backoff::Exponential(base),
        };
        Self {
            max_retries: config.max_retries,
            backoff,
            attempt_timeout,
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error or the
    /// retry budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, label: &'static str, mut op: F) -> Result<T, UpstreamError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match timeout(self.attempt_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(UpstreamError::Timeout(label.to_string())),
            };

            let err = match result {
                Ok(value) => {
                    counter!(UPSTREAM_ATTEMPTS, "endpoint" => label, "outcome" => "ok")
                        .increment(1);
                    if attempt > 1 {
                        tracing::info!(endpoint = label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };
            counter!(UPSTREAM_ATTEMPTS, "endpoint" => label, "outcome" => "error").increment(1);

            if !err.is_retryable() || attempt > self.max_retries {
                if err.is_retryable() {
                    counter!(UPSTREAM_FAILURES, "endpoint" => label).increment(1);
                    tracing::warn!(endpoint = label, attempt, error = %err, "retries exhausted");
                } else {
                    tracing::debug!(endpoint = label, attempt, error = %err, "non-retryable failure");
                }
                return Err(err);
            }

            let delay = self.backoff.delay(attempt);
            tracing::warn!(
                endpoint = label,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            counter!(UPSTREAM_RETRIES, "endpoint" => label).increment(1);
            sleep(delay).await;
        }
    }
}
