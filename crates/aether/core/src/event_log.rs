//! Bounded, newest-first event log.
//!
//! Entries are stamped by the log's own clock at append time. When the log is
//! full the oldest entry is evicted before the new one goes in; nothing else
//! ever removes an entry.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Substring that marks a message as an alert.
pub const ALERT_MARKER: &str = "ALERT";

/// Default number of retained entries.
pub const DEFAULT_LOG_CAPACITY: usize = 7;

/// Wall-clock source for log timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Severity tag derived from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Alert,
}

impl Severity {
    /// Classify a message: anything carrying [`ALERT_MARKER`] is an alert.
    pub fn classify(message: &str) -> Self {
        if message.contains(ALERT_MARKER) {
            Severity::Alert
        } else {
            Severity::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

/// One immutable log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    /// `HH:MM:SS`, 24-hour, zero padded.
    pub fn clock_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn is_alert(&self) -> bool {
        self.severity == Severity::Alert
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.clock_time(), self.message)
    }
}

/// Capacity-bounded log, newest entry first.
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl EventLog {
    /// Create an empty log. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            clock,
        }
    }

    /// Append with an explicit severity.
    pub fn append(&mut self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry {
            timestamp: self.clock.now(),
            message: message.into(),
            severity,
        };
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Append, classifying severity from the message text.
    pub fn append_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        let severity = Severity::classify(&message);
        self.append(message, severity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
