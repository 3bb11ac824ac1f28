use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use std::sync::Arc;
use std::time::Duration;

/// A no-op monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

/// A monitor that emits one `tracing` event per statement.
///
/// Events go to the `sphinxql.sql` target: `info` for successes, `warn` for
/// failures and slow statements.
#[derive(Debug, Clone)]
pub struct LoggingMonitor {
    /// Minimum duration to log (filters out fast statements).
    pub min_duration: Option<Duration>,
    /// Whether to log the full statement or truncate.
    pub max_sql_length: Option<usize>,
}

impl Default for LoggingMonitor {
    fn default() -> Self {
        Self {
            min_duration: None,
            max_sql_length: Some(200),
        }
    }
}

impl LoggingMonitor {
    /// Create a new logging monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only log statements slower than this duration.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    /// Set maximum statement length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryMonitor for LoggingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if let Some(min) = self.min_duration {
            if duration < min {
                return;
            }
        }

        let sql = self.truncate_sql(&ctx.sql);
        let tag = ctx.tag.as_deref().unwrap_or("-");
        let kind = ctx.kind.map_or("OTHER", |k| k.keyword());
        if result.is_error() {
            tracing::warn!(target: "sphinxql.sql", kind, tag, ?duration, %result, %sql, "statement failed");
        } else {
            tracing::info!(target: "sphinxql.sql", kind, tag, ?duration, %result, %sql, "statement complete");
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        let sql = self.truncate_sql(&ctx.sql);
        let kind = ctx.kind.map_or("OTHER", |k| k.keyword());
        tracing::warn!(target: "sphinxql.sql", kind, ?duration, %sql, "slow statement");
    }
}

/// Fans every event out to a list of monitors, in the order they were added.
#[derive(Clone, Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    /// Create an empty composite monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a monitor (builder style).
    pub fn with<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.with_arc(Arc::new(monitor))
    }

    /// Append a shared monitor (builder style).
    pub fn with_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.push(monitor);
        self
    }

    /// Append a shared monitor.
    pub fn push(&mut self, monitor: Arc<dyn QueryMonitor>) {
        self.monitors.push(monitor);
    }

    /// Number of monitors.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Check if no monitors were added.
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    fn each(&self, event: impl Fn(&dyn QueryMonitor)) {
        self.monitors.iter().for_each(|m| event(m.as_ref()));
    }
}

impl FromIterator<Arc<dyn QueryMonitor>> for CompositeMonitor {
    fn from_iter<I: IntoIterator<Item = Arc<dyn QueryMonitor>>>(iter: I) -> Self {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        self.each(|m| m.on_query_start(ctx));
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.each(|m| m.on_query_complete(ctx, duration, result));
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        self.each(|m| m.on_slow_query(ctx, duration));
    }
}
