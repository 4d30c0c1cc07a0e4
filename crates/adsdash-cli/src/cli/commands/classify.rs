//! `adsdash classify` – normalize one raw error.

use adsdash_core::classify::{classify, to_user_message};
use adsdash_core::storage::KeyValueStore;
use adsdash_core::ErrorHandler;
use anyhow::Result;

use super::parse_raw;

pub fn run_classify<S: KeyValueStore>(
    handler: &ErrorHandler<S>,
    raw: &str,
    record: bool,
    context: &str,
) -> Result<()> {
    let value = parse_raw(raw);
    let (normalized, user_message) = if record {
        let handled = handler.handle(&value, context);
        (handled.normalized, handled.user_message)
    } else {
        let normalized = classify(&value);
        let msg = to_user_message(&normalized);
        (normalized, msg)
    };

    let opt = |v: Option<i64>| v.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
    println!("kind:      {}", normalized.kind);
    println!("code:      {}", opt(normalized.code));
    println!("subcode:   {}", opt(normalized.subcode));
    println!("message:   {}", normalized.message);
    println!("user:      {}", user_message);
    println!("retryable: {}", handler.is_retryable(&normalized));
    Ok(())
}
