use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{ErrorKind, NormalizedError};

/// Where the error was observed. Copied into every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub user_agent: Option<String>,
    pub url: Option<String>,
}

impl Environment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// One recorded error, as stored in the persisted ring buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub kind: ErrorKind,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub subcode: Option<i64>,
    pub message: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LogEntry {
    pub fn new(err: &NormalizedError, context: &str, env: &Environment) -> Self {
        Self {
            timestamp: Utc::now(),
            context: context.to_string(),
            kind: err.kind,
            code: err.code,
            subcode: err.subcode,
            message: err.message.clone(),
            user_agent: env.user_agent.clone(),
            url: env.url.clone(),
        }
    }

    /// Bucket used by the stats breakdown: the code if present, else the kind.
    pub fn breakdown_key(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => self.kind.to_string(),
        }
    }
}
