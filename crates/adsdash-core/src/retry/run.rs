//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;

use super::policy::{RetryDecision, RetryPolicy};
use crate::classify::{classify_error, RawError};
use crate::error_log::ErrorLog;
use crate::storage::KeyValueStore;

/// Runs `operation` until it succeeds or the policy says to stop.
///
/// Every failure is classified and recorded in `log` under `context`.
/// Attempts are strictly sequential. On a non-retryable failure, or once
/// `max_retries` retries are used up, the original error is returned.
pub async fn run_with_backoff<S, F, Fut, T, E>(
    policy: &RetryPolicy,
    log: &ErrorLog<S>,
    context: &str,
    mut operation: F,
) -> Result<T, E>
where
    S: KeyValueStore,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RawError,
{
    let mut attempt = 1u32;
    loop {
        tracing::debug!(context, attempt, "attempting operation");
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(context, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                let normalized = classify_error(&e);
                log.record(&normalized, context);
                match policy.decide(attempt, &normalized) {
                    RetryDecision::NoRetry => {
                        tracing::warn!(
                            context,
                            attempt,
                            kind = %normalized.kind,
                            code = ?normalized.code,
                            retryable = policy.is_retryable(&normalized),
                            "giving up: {}",
                            normalized.message
                        );
                        return Err(e);
                    }
                    RetryDecision::RetryAfter(delay) => {
                        tracing::info!(
                            context,
                            attempt,
                            kind = %normalized.kind,
                            code = ?normalized.code,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after failure: {}",
                            normalized.message
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::GraphApiError;
    use crate::storage::MemoryStore;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;
    use tokio::time::Instant;

    // The paused clock may round a deadline up to the next millisecond tick.
    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    fn log() -> ErrorLog<MemoryStore> {
        ErrorLog::new(MemoryStore::new())
    }

    #[tokio::test(start_paused = true)]
    async fn fails_twice_then_succeeds() {
        let log = log();
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);
        let stamps = RefCell::new(Vec::new());

        let out: Result<&str, GraphApiError> = run_with_backoff(&policy, &log, "insights", || {
            calls.set(calls.get() + 1);
            stamps.borrow_mut().push(Instant::now());
            let n = calls.get();
            async move {
                if n <= 2 {
                    Err(GraphApiError::new("Service temporarily unavailable", 2))
                } else {
                    Ok("rows")
                }
            }
        })
        .await;

        assert_eq!(out.unwrap(), "rows");
        assert_eq!(calls.get(), 3);
        let stamps = stamps.into_inner();
        assert_close(stamps[1] - stamps[0], Duration::from_millis(1000));
        assert_close(stamps[2] - stamps[1], Duration::from_millis(2000));
        assert_eq!(log.stats().total, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_token_is_not_retried() {
        let log = log();
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let out: Result<(), GraphApiError> = run_with_backoff(&policy, &log, "accounts", || {
            calls.set(calls.get() + 1);
            async { Err(GraphApiError::new("Error validating access token", 190)) }
        })
        .await;

        let err = out.unwrap_err();
        assert_eq!(err.code, Some(190));
        assert_eq!(calls.get(), 1);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_exhausting_retries() {
        let log = log();
        let policy = RetryPolicy::new(2, Duration::from_millis(100));
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let out: Result<(), String> = run_with_backoff(&policy, &log, "campaigns", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(out.unwrap_err(), "failure 3");
        assert_eq!(calls.get(), 3);
        assert_close(Instant::now() - start, Duration::from_millis(300));

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.context == "campaigns"));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_records_nothing() {
        let log = log();
        let out: Result<u8, String> =
            run_with_backoff(&RetryPolicy::default(), &log, "me", || async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(log.stats().total, 0);
    }
}
