//! Retry and backoff policy.
//!
//! Failures are classified (see [`crate::classify`]) and the policy decides
//! whether another attempt can help. Permanent authorization and permission
//! failures are returned at once; everything else is retried with
//! exponential backoff.

mod policy;
mod run;

pub use policy::{NonRetryable, RetryDecision, RetryPolicy, DEFAULT_NON_RETRYABLE_CODES};
pub use run::run_with_backoff;
