use super::types::{QueryContext, QueryMonitor, QueryResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One executed statement as kept in the [`ExecutionLog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    /// Statement text as sent.
    pub sql: String,
    /// When the statement was sent.
    pub started_at: DateTime<Utc>,
    /// Wall-clock execution time.
    pub duration: Duration,
    /// Transport failure message, if the statement failed.
    pub error: Option<String>,
}

/// Bounded, in-order log of executed statements.
///
/// Once `capacity` entries are held, recording a new one evicts the oldest.
#[derive(Debug)]
pub struct ExecutionLog {
    entries: Mutex<VecDeque<StatEntry>>,
    capacity: usize,
}

impl ExecutionLog {
    /// Create an empty log holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, evicting the oldest when full.
    pub fn record(&self, entry: StatEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<StatEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Text of the most recently recorded statement.
    pub fn last_query(&self) -> Option<String> {
        self.lock().back().map(|entry| entry.sql.clone())
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // Poisoning is ignored: every mutation is a single push or pop.
    fn lock(&self) -> MutexGuard<'_, VecDeque<StatEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl QueryMonitor for ExecutionLog {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let error = match result {
            QueryResult::Error(message) => Some(message.clone()),
            _ => None,
        };
        self.record(StatEntry {
            sql: ctx.sql.clone(),
            started_at: ctx.started_at,
            duration,
            error,
        });
    }
}
