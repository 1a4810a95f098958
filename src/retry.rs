//! Retry logic with linear backoff
//!
//! The primary listing fetch is retried on any failure — transport errors and
//! non-success HTTP statuses alike — with a gentle linear backoff between
//! attempts: attempt `n` sleeps `backoff_base * n` before the next try.
//! Report document downloads are deliberately *not* routed through this
//! module; they are best-effort single attempts.

use crate::config::RetryConfig;
use std::future::Future;

/// Execute an async fetch operation under the configured retry budget
///
/// # Arguments
///
/// * `config` - Retry configuration (total attempts, linear backoff base)
/// * `operation` - Async closure returning `Result<T, E>`; every error is
///   treated as retryable
///
/// # Returns
///
/// The first successful result, or the last error once the attempt budget is
/// exhausted. A `max_attempts` of 0 is treated as 1 — the operation always
/// runs at least once.
pub async fn with_linear_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt < max_attempts => {
                let delay = config.backoff_base * attempt;
                tracing::warn!(
                    error = %error,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    "fetch attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    attempts = attempt,
                    "fetch failed after all attempts"
                );
                return Err(error);
            }
        }
    }
}
