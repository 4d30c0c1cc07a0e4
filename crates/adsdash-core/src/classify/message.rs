//! Map normalized errors to text shown to dashboard users.

use super::{ErrorKind, NormalizedError, FALLBACK_MESSAGE};

const SESSION_EXPIRED: &str = "session expired, please log in again";
const NO_PERMISSION: &str = "no permission to access this data";
const REQUEST_LIMIT: &str = "request limit reached, wait before retrying";

/// Message for a Graph API error code, if the code is known.
pub fn user_message_for_code(code: i64) -> Option<&'static str> {
    let msg = match code {
        190 => SESSION_EXPIRED,
        102 => "invalid session, please log in again",
        10 => NO_PERMISSION,
        200 => "no permission to access this ad account",
        4 => "too many requests, wait a few minutes",
        17 => "API call limit reached, try again in an hour",
        803 => "ad account not found or inaccessible",
        2635 => "no access to this business manager",
        1 => "internal API error, try again",
        2 => "service temporarily unavailable",
        _ => return None,
    };
    Some(msg)
}

/// Message for an error kind, if the kind has a canned translation.
pub fn user_message_for_kind(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::RateLimit => Some(REQUEST_LIMIT),
        ErrorKind::TokenExpired => Some(SESSION_EXPIRED),
        ErrorKind::NetworkError => Some("connection error, check your internet"),
        _ => None,
    }
}

// Checked in order against the lowercased message.
const HEURISTICS: &[(&str, &str)] = &[
    ("access token", SESSION_EXPIRED),
    ("permission", NO_PERMISSION),
    ("rate limit", REQUEST_LIMIT),
];

/// Pick the user-facing message: code table, then kind table, then message
/// heuristics, then the message itself. Always non-empty.
pub fn to_user_message(err: &NormalizedError) -> String {
    if let Some(msg) = err.code.and_then(user_message_for_code) {
        return msg.to_string();
    }
    if let Some(msg) = user_message_for_kind(err.kind) {
        return msg.to_string();
    }
    let lowered = err.message.to_lowercase();
    if let Some((_, msg)) = HEURISTICS.iter().find(|(needle, _)| lowered.contains(needle)) {
        return msg.to_string();
    }
    if err.message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        err.message.clone()
    }
}
