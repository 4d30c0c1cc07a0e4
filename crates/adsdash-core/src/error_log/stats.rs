use std::collections::BTreeMap;

use serde::Serialize;

use super::LogEntry;

/// Summary of the error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorStats {
    pub total: usize,
    /// Occurrences per code (or kind, for entries without a code).
    pub breakdown: BTreeMap<String, usize>,
    /// Newest entries, oldest first.
    pub recent: Vec<LogEntry>,
}

impl ErrorStats {
    pub(super) fn from_entries(entries: Vec<LogEntry>, recent: usize) -> Self {
        let mut breakdown = BTreeMap::new();
        for entry in &entries {
            *breakdown.entry(entry.breakdown_key()).or_insert(0) += 1;
        }
        let total = entries.len();
        let recent = entries
            .into_iter()
            .skip(total.saturating_sub(recent))
            .collect();
        Self {
            total,
            breakdown,
            recent,
        }
    }
}
