use super::config::MonitorConfig;
use super::log::{ExecutionLog, StatEntry};
use super::monitors::{CompositeMonitor, NoopMonitor};
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::row::Row;
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A transport wrapper that times every statement, reports it to a monitor and
/// optionally keeps it in an [`ExecutionLog`].
///
/// Monitors only receive events once monitoring is enabled. The execution log is
/// independent of that switch and follows `MonitorConfig::record_stats`.
pub struct InstrumentedTransport<T> {
    inner: T,
    monitor: Arc<dyn QueryMonitor>,
    config: MonitorConfig,
    log: Option<Arc<ExecutionLog>>,
    tag: Option<String>,
}

impl<T: Transport> InstrumentedTransport<T> {
    /// Wrap a transport with no monitoring.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            monitor: Arc::new(NoopMonitor),
            config: MonitorConfig::default(),
            log: None,
            tag: None,
        }
    }

    /// Set the monitor configuration.
    ///
    /// Creates the execution log when `record_stats` is on.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.log = config
            .record_stats
            .then(|| Arc::new(ExecutionLog::new(config.stats_capacity)));
        self.config = config;
        self
    }

    /// Set the statement monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Set the statement monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Add a monitor next to the current one.
    pub fn add_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        let current = std::mem::replace(&mut self.monitor, Arc::new(NoopMonitor));
        self.monitor = Arc::new(CompositeMonitor::new().with_arc(current).with(monitor));
        self
    }

    /// Tag every statement sent through this transport.
    ///
    /// Monitors see it as [`QueryContext::tag`]; wrap a `&T` per call site to
    /// tag statements individually.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// The tag attached to every statement, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Set slow statement threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_query_threshold = Some(threshold);
        self
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = false;
        self
    }

    /// Check if monitoring is enabled.
    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    /// Get the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The execution log, when `record_stats` is on.
    pub fn log(&self) -> Option<&Arc<ExecutionLog>> {
        self.log.as_ref()
    }

    /// Snapshot of the execution log. Empty when `record_stats` is off.
    pub fn stats(&self) -> Vec<StatEntry> {
        self.log.as_ref().map(|log| log.entries()).unwrap_or_default()
    }

    /// Text of the last statement sent through this transport.
    pub fn last_query(&self) -> Option<String> {
        self.log.as_ref().and_then(|log| log.last_query())
    }

    /// Get a reference to the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwrap the wrapped transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if let Some(log) = &self.log {
            log.on_query_complete(ctx, duration, result);
        }

        if !self.config.monitoring_enabled {
            return;
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if let Some(threshold) = self.config.slow_query_threshold {
            if duration > threshold {
                self.monitor.on_slow_query(ctx, duration);
            }
        }
    }

    fn run<R>(
        &self,
        sql: &str,
        call: impl FnOnce(&T) -> Result<R, TransportError>,
        summarize: impl FnOnce(&R) -> QueryResult,
    ) -> Result<R, TransportError> {
        let ctx = match &self.tag {
            Some(tag) => QueryContext::new(sql).with_tag(tag.as_str()),
            None => QueryContext::new(sql),
        };

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = call(&self.inner);
        let duration = start.elapsed();

        let query_result = match &result {
            Ok(value) => summarize(value),
            Err(e) => {
                tracing::debug!(target: "sphinxql.sql", error = %e, sql, "transport failure");
                QueryResult::error(e.message())
            }
        };

        self.report_result(&ctx, duration, &query_result);
        result
    }
}

impl<T: Transport> Transport for InstrumentedTransport<T> {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        self.run(sql, |t| t.query(sql), |rows| QueryResult::Rows(rows.len()))
    }

    fn execute(&self, sql: &str) -> Result<u64, TransportError> {
        self.run(sql, |t| t.execute(sql), |n| QueryResult::Affected(*n))
    }
}
