//! Normalize heterogeneous API failures into a small error taxonomy.
//!
//! Raw failures arrive as JSON-shaped values: a bare string, a Graph API
//! error body (`{"error": {...}}`), an SDK response wrapper
//! (`{"response": {"error": {...}}}`), or anything else. [`classify`] decodes
//! them in a fixed priority order and never fails; [`to_user_message`] turns
//! the result into text fit for the dashboard.

mod kind;
mod message;
mod raw;

pub use kind::ErrorKind;
pub use message::{to_user_message, user_message_for_code, user_message_for_kind};
pub use raw::{GraphApiError, RawError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message used whenever the raw failure carries no usable text.
pub const FALLBACK_MESSAGE: &str = "unknown error";

/// Provider-agnostic representation of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub kind: ErrorKind,
    /// Never empty.
    pub message: String,
    pub code: Option<i64>,
    pub subcode: Option<i64>,
}

impl NormalizedError {
    /// Build an error with no provider codes. An empty message is replaced by
    /// [`FALLBACK_MESSAGE`].
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: non_empty(message.into()),
            code: None,
            subcode: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_subcode(mut self, subcode: i64) -> Self {
        self.subcode = Some(subcode);
        self
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Classify a raw failure value.
///
/// Patterns are tried in order: provider error wrapped in `response.error`,
/// provider error at `error`, plain string, then the `unknown` fallback.
/// Nothing outside those field paths is inspected.
pub fn classify(raw: &Value) -> NormalizedError {
    if let Some(provider) = provider_error(raw) {
        return provider;
    }
    match raw {
        // An empty string keeps the `generic` kind but gets the fallback message.
        Value::String(s) => NormalizedError::new(ErrorKind::Generic, s.as_str()),
        other => {
            let message = other
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_MESSAGE);
            NormalizedError::new(ErrorKind::Unknown, message)
        }
    }
}

/// Classify any error type that can expose its raw shape.
pub fn classify_error<E: RawError + ?Sized>(err: &E) -> NormalizedError {
    classify(&err.to_raw())
}

fn provider_error(raw: &Value) -> Option<NormalizedError> {
    let nested = raw
        .pointer("/response/error")
        .filter(|v| is_provider_shaped(v))
        .or_else(|| raw.get("error").filter(|v| is_provider_shaped(v)))?;

    let message = nested.get("message").and_then(Value::as_str)?;
    Some(NormalizedError {
        kind: ErrorKind::FacebookApi,
        message: non_empty(message.to_string()),
        code: nested.get("code").and_then(Value::as_i64),
        subcode: nested.get("error_subcode").and_then(Value::as_i64),
    })
}

fn is_provider_shaped(v: &Value) -> bool {
    v.get("message").map_or(false, Value::is_string)
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}
