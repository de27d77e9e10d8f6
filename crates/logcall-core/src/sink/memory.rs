use super::LogSink;
use crate::errors::SinkError;
use logcall_core_types::LogLevel;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A message captured by [`MemorySink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub level: LogLevel,
    pub message: String,
}

/// In-process sink keeping every accepted message
///
/// Useful for tests and demos: it counts gate checks and writes, and can be
/// switched to reject writes to exercise sink failure handling.
#[derive(Debug)]
pub struct MemorySink {
    min_level: Option<LogLevel>,
    records: Mutex<Vec<Record>>,
    enabled_checks: AtomicUsize,
    write_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemorySink {
    /// Accept messages at `min_level` and above
    pub fn new(min_level: LogLevel) -> Self {
        Self::with_min_level(Some(min_level))
    }

    /// Accept messages at every level
    pub fn all() -> Self {
        Self::new(LogLevel::Trace)
    }

    /// Report every level as disabled
    pub fn disabled() -> Self {
        Self::with_min_level(None)
    }

    fn with_min_level(min_level: Option<LogLevel>) -> Self {
        Self {
            min_level,
            records: Mutex::new(Vec::new()),
            enabled_checks: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail (`true`) or succeed again (`false`)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get all captured records
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Get the captured messages in write order
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages().pop()
    }

    /// Number of `write` calls, including rejected ones
    pub fn write_count(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Number of `is_enabled` calls
    pub fn enabled_checks(&self) -> usize {
        self.enabled_checks.load(Ordering::SeqCst)
    }

    /// Clear all captured records and counters
    pub fn clear(&self) {
        self.records.lock().map(|mut r| r.clear()).ok();
        self.enabled_checks.store(0, Ordering::SeqCst);
        self.write_calls.store(0, Ordering::SeqCst);
    }
}

impl LogSink for MemorySink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        self.enabled_checks.fetch_add(1, Ordering::SeqCst);
        self.min_level.is_some_and(|min| level >= min)
    }

    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SinkError::new("memory", "writes are switched off"));
        }
        self.records
            .lock()
            .map(|mut records| {
                records.push(Record {
                    level,
                    message: message.to_string(),
                })
            })
            .map_err(|_| SinkError::new("memory", "record buffer poisoned"))
    }
}
