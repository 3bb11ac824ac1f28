//! Statement monitoring and the execution log.
//!
//! [`InstrumentedTransport`] wraps any [`Transport`](crate::transport::Transport),
//! times each statement and reports it to a [`QueryMonitor`]. With
//! `record_stats` on it also keeps the last `stats_capacity` statements in an
//! [`ExecutionLog`] for debugging.
//!
//! # Example
//!
//! ```rust,ignore
//! use sphinxql::monitor::{InstrumentedTransport, LoggingMonitor, MonitorConfig};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_millis(250))
//!     .record_stats(true)
//!     .enable_monitoring();
//!
//! let transport = InstrumentedTransport::new(conn)
//!     .with_config(config)
//!     .with_monitor(LoggingMonitor::new())
//!     .with_tag("search-page");
//!
//! QueryBuilder::new().select_from("products", "id")?.search("@title", ["shoe"])?.execute(&transport)?;
//! println!("{:?}", transport.last_query());
//! ```

mod config;
mod instrumented;
mod log;
mod monitors;
mod types;

#[cfg(test)]
mod tests;

pub use config::MonitorConfig;
pub use instrumented::InstrumentedTransport;
pub use log::{ExecutionLog, StatEntry};
pub use monitors::{CompositeMonitor, LoggingMonitor, NoopMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
