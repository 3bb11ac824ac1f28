use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Configuration for statement monitoring and the execution log.
///
/// By default, monitoring and the execution log are both off.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Whether monitors receive events.
    #[serde(rename = "enabled")]
    pub monitoring_enabled: bool,
    /// Whether executed statements are kept in the execution log.
    pub record_stats: bool,
    /// Maximum number of entries kept in the execution log.
    pub stats_capacity: usize,
    /// Slow statement threshold for alerting.
    #[serde(rename = "slow_query_threshold_ms", deserialize_with = "millis")]
    pub slow_query_threshold: Option<Duration>,
    /// Truncate statement text in log output (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitoring_enabled: false,
            record_stats: false,
            stats_capacity: 100,
            slow_query_threshold: None,
            max_sql_length: Some(200),
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with defaults (monitoring and log disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable monitoring.
    ///
    /// Monitoring must be explicitly enabled for monitors to receive events.
    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.monitoring_enabled = false;
        self
    }

    /// Keep executed statements in the execution log.
    pub fn record_stats(mut self, enabled: bool) -> Self {
        self.record_stats = enabled;
        self
    }

    /// Set the execution log capacity.
    pub fn with_stats_capacity(mut self, capacity: usize) -> Self {
        self.stats_capacity = capacity;
        self
    }

    /// Set the slow statement threshold.
    ///
    /// Statements exceeding this duration trigger `on_slow_query` callbacks.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
