//! Read-only telemetry for external status surfaces.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::RobotStatus;

/// One timestamped operation-log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Bounded ring of operation-log entries. The newest entry evicts the
/// oldest once capacity is reached.
pub struct OperationLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl OperationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Utc::now(),
            message: message.into(),
        });
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Point-in-time view of the robot for presentation surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct RobotSnapshot {
    pub status: RobotStatus,
    pub battery_level: f64,
    pub battery_capacity: f64,
    pub queue_depth: usize,
    pub holding: Option<String>,
    pub staged_items: usize,
    pub orders_completed: usize,
    pub recent_log: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ring_evicts_oldest() {
        let mut log = OperationLog::new(3);
        for i in 1..=5 {
            log.push(format!("entry {i}"));
        }
        assert_eq!(log.len(), 3);
        let recent = log.recent(10);
        let messages: Vec<&str> = recent
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(messages, vec!["entry 3", "entry 4", "entry 5"]);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = OperationLog::new(10);
        for i in 1..=4 {
            log.push(format!("entry {i}"));
        }
        let recent = log.recent(2);
        let last_two: Vec<&str> = recent
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(last_two, vec!["entry 3", "entry 4"]);
    }
}
