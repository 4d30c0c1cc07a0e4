//! Bounded log of handled errors.
//!
//! Entries are kept as a JSON array under a single key of a
//! [`KeyValueStore`]. Each `record` is a read-append-truncate-write cycle;
//! it is not safe against other processes writing the same key.
//! Recording never fails the caller: storage problems are only traced.

mod entry;
mod stats;
mod telemetry;

pub use entry::{Environment, LogEntry};
pub use stats::ErrorStats;
pub use telemetry::{TelemetrySink, TracingSink};

use anyhow::{Context, Result};

use crate::classify::NormalizedError;
use crate::config::ErrorLogConfig;
use crate::storage::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "api_error_log";
pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_RECENT: usize = 10;

/// Ring buffer of [`LogEntry`] records persisted in a key-value store.
pub struct ErrorLog<S> {
    store: S,
    key: String,
    capacity: usize,
    recent: usize,
    environment: Environment,
    telemetry: Option<Box<dyn TelemetrySink>>,
}

impl<S: KeyValueStore> ErrorLog<S> {
    /// Log with the default key, capacity 50 and 10 recent entries.
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: DEFAULT_STORAGE_KEY.to_string(),
            capacity: DEFAULT_CAPACITY,
            recent: DEFAULT_RECENT,
            environment: Environment::default(),
            telemetry: None,
        }
    }

    pub fn from_config(store: S, cfg: &ErrorLogConfig) -> Self {
        Self::new(store)
            .with_key(cfg.storage_key.clone())
            .with_capacity(cfg.capacity)
            .with_recent(cfg.recent)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Capacity is at least 1.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_recent(mut self, recent: usize) -> Self {
        self.recent = recent;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_telemetry(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Some(Box::new(sink));
        self
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append an entry for `err`, evicting the oldest beyond capacity.
    pub fn record(&self, err: &NormalizedError, context: &str) {
        let entry = LogEntry::new(err, context, &self.environment);
        if let Some(sink) = &self.telemetry {
            sink.forward(&entry);
        }
        if let Err(e) = self.append(entry) {
            tracing::warn!(key = %self.key, "failed to persist error log entry: {:#}", e);
        }
    }

    /// Every entry, oldest first. An unreadable buffer reads as empty.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to read error log: {:#}", e);
                Vec::new()
            }
        }
    }

    pub fn stats(&self) -> ErrorStats {
        ErrorStats::from_entries(self.entries(), self.recent)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, "failed to clear error log: {}", e);
        }
    }

    fn load(&self) -> Result<Vec<LogEntry>> {
        match self.store.get(&self.key)? {
            Some(raw) => self.parse(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn parse(&self, raw: &str) -> Result<Vec<LogEntry>> {
        serde_json::from_str(raw).with_context(|| format!("parse error log under {:?}", self.key))
    }

    /// A failed read skips the write; only an unparsable buffer is replaced.
    fn append(&self, entry: LogEntry) -> Result<()> {
        let raw = self.store.get(&self.key).context("read error log")?;
        let mut entries = match raw {
            Some(raw) => self.parse(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %self.key, "discarding unreadable error log: {:#}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        entries.push(entry);
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        let json = serde_json::to_string(&entries).context("serialize error log")?;
        self.store.set(&self.key, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;
    use crate::storage::{MemoryStore, StorageError};
    use std::sync::{Arc, Mutex};

    fn api(code: i64, message: &str) -> NormalizedError {
        NormalizedError::new(ErrorKind::FacebookApi, message).with_code(code)
    }

    #[test]
    fn sixty_records_keep_newest_fifty_in_order() {
        let log = ErrorLog::new(MemoryStore::new());
        for i in 0..60 {
            log.record(&NormalizedError::new(ErrorKind::Generic, format!("e{i}")), "loop");
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 50);
        let messages: Vec<_> = entries.iter().map(|e| e.message.clone()).collect();
        let expected: Vec<_> = (10..60).map(|i| format!("e{i}")).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn stats_breakdown_matches_tally() {
        let log = ErrorLog::new(MemoryStore::new());
        let fixture = [
            api(190, "expired"),
            api(4, "too many"),
            api(190, "expired again"),
            NormalizedError::new(ErrorKind::Generic, "text"),
            NormalizedError::new(ErrorKind::Unknown, "opaque"),
            api(4, "too many"),
            api(4, "too many"),
            NormalizedError::new(ErrorKind::Generic, "more text"),
        ];
        for err in &fixture {
            log.record(err, "fixture");
        }

        let stats = log.stats();
        assert_eq!(stats.total, 8);
        assert_eq!(stats.breakdown.get("190"), Some(&2));
        assert_eq!(stats.breakdown.get("4"), Some(&3));
        assert_eq!(stats.breakdown.get("generic"), Some(&2));
        assert_eq!(stats.breakdown.get("unknown"), Some(&1));
        assert_eq!(stats.breakdown.values().sum::<usize>(), stats.total);
    }

    #[test]
    fn recent_is_last_ten_chronological() {
        let log = ErrorLog::new(MemoryStore::new());
        for i in 0..25 {
            log.record(&api(i, "m"), "ctx");
        }
        let recent = log.stats().recent;
        let codes: Vec<_> = recent.iter().filter_map(|e| e.code).collect();
        assert_eq!(codes, (15..25).collect::<Vec<_>>());
    }

    #[test]
    fn clear_empties_buffer() {
        let log = ErrorLog::new(MemoryStore::new());
        log.record(&api(1, "m"), "ctx");
        log.clear();
        assert_eq!(log.stats().total, 0);
        log.clear();
    }

    #[test]
    fn entry_carries_context_and_environment() {
        let env = Environment::new("adsdash/test").with_url("https://dash.example/campaigns");
        let log = ErrorLog::new(MemoryStore::new()).with_environment(env);
        log.record(&api(803, "gone").with_subcode(33), "load_account");

        let e = &log.entries()[0];
        assert_eq!(e.context, "load_account");
        assert_eq!(e.kind, ErrorKind::FacebookApi);
        assert_eq!(e.code, Some(803));
        assert_eq!(e.subcode, Some(33));
        assert_eq!(e.user_agent.as_deref(), Some("adsdash/test"));
        assert_eq!(e.url.as_deref(), Some("https://dash.example/campaigns"));
    }

    #[test]
    fn corrupt_buffer_is_replaced() {
        let store = MemoryStore::new();
        store.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let log = ErrorLog::new(store);
        assert!(log.entries().is_empty());
        log.record(&api(2, "m"), "ctx");
        assert_eq!(log.entries().len(), 1);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }
        fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
        fn remove(&self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    /// Fails the first `get` after `armed` is set, then behaves normally.
    struct FlakyStore {
        inner: MemoryStore,
        armed: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.armed.swap(false, std::sync::atomic::Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "busy"),
                });
            }
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_read_keeps_existing_history() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            armed: std::sync::atomic::AtomicBool::new(false),
        };
        let log = ErrorLog::new(&store);
        for i in 0..50 {
            log.record(&api(i, "old"), "ctx");
        }

        store.armed.store(true, std::sync::atomic::Ordering::SeqCst);
        log.record(&api(99, "new"), "ctx");

        let entries = log.entries();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].code, Some(0));
        assert!(entries.iter().all(|e| e.message == "old"));

        log.record(&api(100, "after"), "ctx");
        let entries = log.entries();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries.last().unwrap().code, Some(100));
    }

    #[test]
    fn storage_failures_never_reach_caller() {
        let log = ErrorLog::new(BrokenStore);
        log.record(&api(1, "m"), "ctx");
        log.clear();
        assert_eq!(log.stats().total, 0);
    }

    #[test]
    fn telemetry_sees_every_entry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let log = ErrorLog::new(BrokenStore).with_telemetry(move |e: &LogEntry| {
            sink_seen.lock().unwrap().push(e.breakdown_key());
        });
        log.record(&api(17, "limit"), "a");
        log.record(&NormalizedError::new(ErrorKind::Unknown, "x"), "b");
        assert_eq!(*seen.lock().unwrap(), vec!["17".to_string(), "unknown".to_string()]);
    }

    #[test]
    fn custom_key_and_capacity() {
        let store = MemoryStore::new();
        let log = ErrorLog::new(&store).with_key("other").with_capacity(2);
        for i in 0..5 {
            log.record(&api(i, "m"), "ctx");
        }
        assert_eq!(log.entries().len(), 2);
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
        assert!(store.get("other").unwrap().is_some());
    }
}
