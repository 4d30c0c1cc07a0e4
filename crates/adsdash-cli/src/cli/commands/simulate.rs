//! `adsdash simulate` – dry-run the configured retry policy against a
//! scripted sequence of failures.

use std::cell::RefCell;
use std::collections::VecDeque;

use adsdash_core::classify::{classify, to_user_message};
use adsdash_core::storage::KeyValueStore;
use adsdash_core::ErrorHandler;
use anyhow::Result;
use serde_json::Value;
use tokio::time::Instant;

use super::parse_raw;

pub async fn run_simulate<S: KeyValueStore>(
    handler: &ErrorHandler<S>,
    raw: &[String],
    context: &str,
) -> Result<()> {
    let failures: RefCell<VecDeque<Value>> =
        RefCell::new(raw.iter().map(|r| parse_raw(r)).collect());
    let attempts = RefCell::new(0u32);
    let start = Instant::now();

    let outcome = handler
        .run_with_backoff(context, || {
            *attempts.borrow_mut() += 1;
            let n = *attempts.borrow();
            let next = failures.borrow_mut().pop_front();
            println!("attempt {} at +{}ms", n, start.elapsed().as_millis());
            async move {
                match next {
                    Some(err) => Err(err),
                    None => Ok(n),
                }
            }
        })
        .await;

    match outcome {
        Ok(n) => println!("succeeded on attempt {n}"),
        Err(err) => {
            let normalized = classify(&err);
            println!(
                "failed after {} attempt(s): {} ({})",
                attempts.borrow(),
                normalized,
                to_user_message(&normalized)
            );
        }
    }
    Ok(())
}
