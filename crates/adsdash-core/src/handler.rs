//! One-stop API error handling for dashboard code.
//!
//! [`ErrorHandler`] ties the classifier, the retry policy and the error log
//! together so call sites only deal with one object.

use std::future::Future;

use serde::Serialize;

use crate::classify::{classify_error, to_user_message, NormalizedError, RawError};
use crate::config::AdsdashConfig;
use crate::error_log::{Environment, ErrorLog, ErrorStats};
use crate::retry::{run_with_backoff, RetryPolicy};
use crate::storage::KeyValueStore;

/// Result of handling a single failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandledError {
    pub normalized: NormalizedError,
    pub user_message: String,
}

pub struct ErrorHandler<S> {
    policy: RetryPolicy,
    log: ErrorLog<S>,
}

impl<S: KeyValueStore> ErrorHandler<S> {
    pub fn new(policy: RetryPolicy, log: ErrorLog<S>) -> Self {
        Self { policy, log }
    }

    /// Handler configured from `cfg`, persisting into `store`.
    pub fn from_config(store: S, cfg: &AdsdashConfig) -> Self {
        let policy = RetryPolicy::from_config(&cfg.retry_or_default());
        let log = ErrorLog::from_config(store, &cfg.error_log_or_default())
            .with_environment(Environment::new(cfg.user_agent_or_default()));
        Self::new(policy, log)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn log(&self) -> &ErrorLog<S> {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ErrorLog<S> {
        &mut self.log
    }

    /// Classify, trace and record a failure; return what to show the user.
    pub fn handle<E: RawError + ?Sized>(&self, err: &E, context: &str) -> HandledError {
        let normalized = classify_error(err);
        tracing::error!(
            context,
            kind = %normalized.kind,
            code = ?normalized.code,
            subcode = ?normalized.subcode,
            "{}",
            normalized.message
        );
        self.log.record(&normalized, context);
        let user_message = to_user_message(&normalized);
        HandledError {
            normalized,
            user_message,
        }
    }

    pub fn is_retryable(&self, err: &NormalizedError) -> bool {
        self.policy.is_retryable(err)
    }

    /// See [`run_with_backoff`].
    pub async fn run_with_backoff<F, Fut, T, E>(&self, context: &str, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RawError,
    {
        run_with_backoff(&self.policy, &self.log, context, operation).await
    }

    pub fn stats(&self) -> ErrorStats {
        self.log.stats()
    }

    pub fn clear(&self) {
        self.log.clear()
    }
}
