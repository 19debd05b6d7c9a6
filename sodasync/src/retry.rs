use sodasync_config::shared::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::SyncResult;

/// Runs `operation` until it succeeds, fails with a non-transient error, or the
/// retry budget is exhausted.
///
/// Delays between attempts grow exponentially from `initial_delay_ms` by
/// `backoff_factor`, capped at `max_delay_ms`. Only errors classified as
/// transient (see [`crate::error::ErrorKind::is_transient`]) are retried; the
/// operation must be idempotent.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryConfig,
    description: &str,
    mut operation: F,
) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    let mut attempt: u32 = 1;
    let mut delay_ms = policy.initial_delay_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms,
                    error = %err,
                    "{description} failed with a transient error, retrying"
                );

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                attempt += 1;
                delay_ms = ((delay_ms as f64) * f64::from(policy.backoff_factor)) as u64;
                delay_ms = delay_ms.min(policy.max_delay_ms);
            }
            Err(err) => return Err(err),
        }
    }
}
