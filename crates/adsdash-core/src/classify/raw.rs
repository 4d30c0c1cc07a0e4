//! Raw failure shapes that can be fed to the classifier.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// An error that can present itself as the raw value `classify` decodes.
pub trait RawError {
    fn to_raw(&self) -> Value;
}

impl RawError for Value {
    fn to_raw(&self) -> Value {
        self.clone()
    }
}

impl RawError for str {
    fn to_raw(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl RawError for String {
    fn to_raw(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Opaque errors only expose their message, so they classify as `unknown`
/// unless a [`GraphApiError`] sits in the chain.
impl RawError for anyhow::Error {
    fn to_raw(&self) -> Value {
        match self.chain().find_map(|e| e.downcast_ref::<GraphApiError>()) {
            Some(api) => api.to_raw(),
            None => json!({ "message": self.to_string() }),
        }
    }
}

/// Error body returned by the Graph API (`{"error": {...}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphApiError {
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    error: GraphApiError,
}

impl GraphApiError {
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            code: Some(code),
            error_subcode: None,
            fbtrace_id: None,
        }
    }

    /// Parse a response body of the form `{"error": {...}}`.
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Envelope>(body).map(|e| e.error)
    }
}

impl fmt::Display for GraphApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "Graph API error {}: {}", code, self.message),
            None => write!(f, "Graph API error: {}", self.message),
        }
    }
}

impl std::error::Error for GraphApiError {}

impl RawError for GraphApiError {
    fn to_raw(&self) -> Value {
        json!({ "error": self })
    }
}
