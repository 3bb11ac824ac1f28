//! The connection boundary.
//!
//! The builder never opens sockets. Anything that can run a complete SphinxQL
//! statement and hand back rows or an affected-row count implements
//! [`Transport`], whether a MySQL-protocol connection, a test double, or
//! [`InstrumentedTransport`](crate::monitor::InstrumentedTransport) wrapping one.

use crate::row::Row;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

/// A failure reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for TransportError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TransportError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Runs statement text against a search daemon.
///
/// Calls block until the daemon answers. Timeouts, retries and reconnects are
/// the implementor's business.
pub trait Transport {
    /// Run a statement that returns rows (SELECT, SHOW, ...).
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError>;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> Result<u64, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        (**self).query(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64, TransportError> {
        (**self).execute(sql)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        (**self).query(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64, TransportError> {
        (**self).execute(sql)
    }
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        (**self).query(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64, TransportError> {
        (**self).execute(sql)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        (**self).query(sql)
    }

    fn execute(&self, sql: &str) -> Result<u64, TransportError> {
        (**self).execute(sql)
    }
}
