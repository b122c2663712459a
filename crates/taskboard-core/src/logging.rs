use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
        }
    }
}

pub trait Loggable {
    fn add_log(&mut self, level: LogLevel, message: String);
    fn get_logs(&self) -> &[LogEntry];
}

/// Bounded, oldest-first record of sync events a UI may surface
/// (a card snapping back, an update that never reached the server).
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    limit: usize,
}

impl ActivityLog {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_limit(crate::config::DEFAULT_ACTIVITY_LOG_LIMIT)
    }
}

impl Loggable for ActivityLog {
    fn add_log(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry::new(level, message));
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    fn get_logs(&self) -> &[LogEntry] {
        &self.entries
    }
}
