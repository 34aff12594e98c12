/// Diagnostic log for upstream API interactions.
///
/// An append-only ring buffer of recent operations, retrieved newest-first
/// and capped at a fixed capacity by dropping the oldest entries. The admin
/// collaborator reads it for troubleshooting; nothing in this crate reads
/// it back on the request path.
///
/// Unlike a process-global logger, `DiagnosticLog` is an explicitly
/// constructed instance handed to `client::UsgsClient` at construction
/// time, so tests can inspect entries without shared process state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of retained entries before the oldest are dropped.
pub const MAX_LOG_ENTRIES: usize = 100;

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A single recorded operation, with an arbitrary structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub data: serde_json::Value,
}

/// Counts of retained entries by level, recomputed on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub total: usize,
    pub debug: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

// ---------------------------------------------------------------------------
// Diagnostic log
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DiagnosticLog {
    /// Newest entry at the front.
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl DiagnosticLog {
    pub fn new() -> DiagnosticLog {
        DiagnosticLog::with_capacity(MAX_LOG_ENTRIES)
    }

    /// A log with a non-default capacity. Used by tests; production code
    /// uses `new`.
    pub fn with_capacity(capacity: usize) -> DiagnosticLog {
        DiagnosticLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends an entry, dropping the oldest once capacity is exceeded.
    pub fn append(&mut self, level: LogLevel, message: impl Into<String>, data: serde_json::Value) {
        self.entries.push_front(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data,
        });
        self.entries.truncate(self.capacity);
    }

    /// Returns entries newest-first, optionally filtered by exact level and
    /// truncated from the newest end.
    pub fn query_all(&self, level: Option<LogLevel>, limit: Option<usize>) -> Vec<LogEntry> {
        let filtered = self
            .entries
            .iter()
            .filter(|entry| level.map_or(true, |lvl| entry.level == lvl))
            .cloned();
        match limit {
            Some(n) => filtered.take(n).collect(),
            None => filtered.collect(),
        }
    }

    /// Empties the log. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-level counts over the retained entries. A plain scan — no
    /// incremental counters to fall out of sync.
    pub fn stats(&self) -> LogStats {
        let mut stats = LogStats {
            total: self.entries.len(),
            ..LogStats::default()
        };
        for entry in &self.entries {
            match entry.level {
                LogLevel::Debug => stats.debug += 1,
                LogLevel::Info => stats.info += 1,
                LogLevel::Warning => stats.warning += 1,
                LogLevel::Error => stats.error += 1,
            }
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_retrieves_newest_first() {
        let mut log = DiagnosticLog::new();
        log.append(LogLevel::Info, "first", json!({}));
        log.append(LogLevel::Info, "second", json!({}));

        let entries = log.query_all(None, None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn test_capacity_drops_oldest_entry_first() {
        let mut log = DiagnosticLog::with_capacity(3);
        for i in 0..4 {
            log.append(LogLevel::Debug, format!("entry {}", i), json!({ "n": i }));
        }

        let entries = log.query_all(None, None);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "entry 3", "newest retained at the front");
        assert_eq!(entries[2].message, "entry 1", "entry 0 was evicted");
    }

    #[test]
    fn test_eviction_beyond_default_capacity() {
        let mut log = DiagnosticLog::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            log.append(LogLevel::Info, format!("entry {}", i), json!({}));
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        let entries = log.query_all(None, None);
        assert_eq!(entries[0].message, format!("entry {}", MAX_LOG_ENTRIES + 4));
        assert_eq!(
            entries.last().map(|e| e.message.as_str()),
            Some("entry 5"),
            "the five oldest entries should have been dropped"
        );
    }

    #[test]
    fn test_level_filter_is_exact_match() {
        let mut log = DiagnosticLog::new();
        log.append(LogLevel::Debug, "request", json!({}));
        log.append(LogLevel::Error, "request failed", json!({}));
        log.append(LogLevel::Warning, "invalid site", json!({}));

        let errors = log.query_all(Some(LogLevel::Error), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "request failed");
    }

    #[test]
    fn test_limit_truncates_from_newest_end() {
        let mut log = DiagnosticLog::new();
        for i in 0..5 {
            log.append(LogLevel::Info, format!("entry {}", i), json!({}));
        }
        let limited = log.query_all(None, Some(2));
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].message, "entry 4");
        assert_eq!(limited[1].message, "entry 3");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut log = DiagnosticLog::new();
        log.append(LogLevel::Info, "entry", json!({}));
        log.clear();
        assert!(log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_stats_counts_by_level() {
        let mut log = DiagnosticLog::new();
        log.append(LogLevel::Debug, "a", json!({}));
        log.append(LogLevel::Debug, "b", json!({}));
        log.append(LogLevel::Warning, "c", json!({}));
        log.append(LogLevel::Error, "d", json!({}));

        let stats = log.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.debug, 2);
        assert_eq!(stats.info, 0);
        assert_eq!(stats.warning, 1);
        assert_eq!(stats.error, 1);
    }

    #[test]
    fn test_stats_reflect_eviction() {
        let mut log = DiagnosticLog::with_capacity(2);
        log.append(LogLevel::Error, "old error", json!({}));
        log.append(LogLevel::Info, "a", json!({}));
        log.append(LogLevel::Info, "b", json!({}));

        let stats = log.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.error, 0, "evicted entries do not count");
        assert_eq!(stats.info, 2);
    }

    #[test]
    fn test_entry_payload_preserved() {
        let mut log = DiagnosticLog::new();
        log.append(
            LogLevel::Info,
            "Validating USGS site",
            json!({ "site_number": "05568500", "method": "validate_site" }),
        );
        let entries = log.query_all(None, Some(1));
        assert_eq!(entries[0].data["site_number"], "05568500");
    }
}
