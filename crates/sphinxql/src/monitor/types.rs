use crate::statement::StatementKind;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The statement text sent to the daemon.
    pub sql: String,
    /// Detected statement kind (`None` for SHOW, CALL, ...).
    pub kind: Option<StatementKind>,
    /// Wall-clock time the statement was sent.
    pub started_at: DateTime<Utc>,
    /// Optional tag for identification.
    pub tag: Option<String>,
}

impl QueryContext {
    /// Create a new context, stamped with the current time.
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            kind: StatementKind::from_sql(sql),
            started_at: Utc::now(),
            tag: None,
        }
    }

    /// Add a tag to identify this statement.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Result of a statement execution for monitoring purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Statement returned rows.
    Rows(usize),
    /// Statement affected rows.
    Affected(u64),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message.
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    /// Check if the statement failed.
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for monitoring statement execution.
///
/// Implement this trait to collect metrics, log statements, or integrate
/// with observability systems.
pub trait QueryMonitor: Send + Sync {
    /// Called before a statement is sent.
    ///
    /// Default implementation does nothing.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after a statement completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a slow statement is detected.
    ///
    /// Default implementation does nothing. Override to add alerting.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}
