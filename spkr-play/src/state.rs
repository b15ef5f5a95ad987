//! Shared message log
//!
//! The in-memory counterpart of the page's message list: application glue
//! appends one line per received clip and per player state change, and an
//! embedding UI reads the recent tail. The player core never writes here.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Default number of lines retained
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// One timestamped log line
#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Bounded in-memory list of status lines
///
/// Oldest lines are dropped once the capacity is reached.
pub struct MessageLog {
    lines: RwLock<VecDeque<LogLine>>,
    capacity: usize,
}

impl MessageLog {
    /// Create a log retaining at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, dropping the oldest when full
    pub async fn append(&self, text: impl Into<String>) {
        let mut lines = self.lines.write().await;
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(LogLine {
            at: spkr_common::time::now(),
            text: text.into(),
        });
    }

    /// The most recent `n` lines, oldest first
    pub async fn recent(&self, n: usize) -> Vec<LogLine> {
        let lines = self.lines.read().await;
        lines.iter().rev().take(n).rev().cloned().collect()
    }

    /// Number of retained lines
    pub async fn len(&self) -> usize {
        self.lines.read().await.len()
    }

    /// True when nothing has been logged yet
    pub async fn is_empty(&self) -> bool {
        self.lines.read().await.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
