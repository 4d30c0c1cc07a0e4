//! CLI command handlers, one per file.

mod classify;
mod clear;
mod completions;
mod simulate;
mod stats;

pub use classify::run_classify;
pub use clear::run_clear;
pub use completions::run_completions;
pub use simulate::run_simulate;
pub use stats::run_stats;

use serde_json::Value;

/// Parse a raw error argument: JSON if it parses, otherwise plain text.
pub(crate) fn parse_raw(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}
