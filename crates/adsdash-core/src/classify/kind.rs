use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a normalized error.
///
/// `classify` only ever produces `FacebookApi`, `Generic` and `Unknown`. The
/// remaining kinds are set by callers that already know the cause (e.g. the
/// networking layer) and feed message lookup and retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Error reported by the Graph API; carries code/subcode.
    FacebookApi,
    /// Failure given only as text.
    Generic,
    /// Anything without a recognizable shape.
    Unknown,
    RateLimit,
    TokenExpired,
    NetworkError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FacebookApi => "facebook_api",
            ErrorKind::Generic => "generic",
            ErrorKind::Unknown => "unknown",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::TokenExpired => "token_expired",
            ErrorKind::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook_api" => Ok(ErrorKind::FacebookApi),
            "generic" => Ok(ErrorKind::Generic),
            "unknown" => Ok(ErrorKind::Unknown),
            "rate_limit" => Ok(ErrorKind::RateLimit),
            "token_expired" => Ok(ErrorKind::TokenExpired),
            "network_error" => Ok(ErrorKind::NetworkError),
            other => Err(format!("unknown error kind: {other}")),
        }
    }
}
