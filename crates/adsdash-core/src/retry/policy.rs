use std::collections::BTreeSet;
use std::time::Duration;

use crate::classify::{ErrorKind, NormalizedError};
use crate::config::RetryConfig;

/// Graph API codes that mean bad credentials or missing permission.
pub const DEFAULT_NON_RETRYABLE_CODES: [i64; 5] = [190, 102, 10, 200, 803];

/// Errors that retrying cannot fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonRetryable {
    pub codes: BTreeSet<i64>,
    pub kinds: BTreeSet<ErrorKind>,
}

impl Default for NonRetryable {
    fn default() -> Self {
        Self {
            codes: DEFAULT_NON_RETRYABLE_CODES.into_iter().collect(),
            kinds: [ErrorKind::TokenExpired].into_iter().collect(),
        }
    }
}

impl NonRetryable {
    /// Retry everything.
    pub fn none() -> Self {
        Self {
            codes: BTreeSet::new(),
            kinds: BTreeSet::new(),
        }
    }

    pub fn matches(&self, err: &NormalizedError) -> bool {
        err.code.map_or(false, |c| self.codes.contains(&c)) || self.kinds.contains(&err.kind)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Capped exponential backoff: the first retry waits `base_delay`, each
/// following retry doubles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound on a single wait.
    pub max_delay: Duration,
    pub non_retryable: NonRetryable,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            non_retryable: NonRetryable::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
            non_retryable: NonRetryable {
                codes: cfg.non_retryable_codes.iter().copied().collect(),
                kinds: cfg.non_retryable_kinds.iter().copied().collect(),
            },
        }
    }

    pub fn is_retryable(&self, err: &NormalizedError) -> bool {
        !self.non_retryable.matches(err)
    }

    /// Wait before the given retry. `retry` is 1-based (1 = first retry).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// Decide what to do after `attempt` (1-based, 1 = first attempt) failed
    /// with `err`.
    pub fn decide(&self, attempt: u32, err: &NormalizedError) -> RetryDecision {
        if !self.is_retryable(err) || attempt > self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for_retry(attempt))
    }
}
