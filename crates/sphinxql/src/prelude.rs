//! Convenient imports for typical `sphinxql` usage.
//!
//! ```ignore
//! use sphinxql::prelude::*;
//! ```

pub use crate::{
    CmpOp, Direction, MatchMode, Output, QlError, QlResult, QueryBuilder, Row, Statement,
    Transport, TransportError, Value,
};
pub use crate::{InstrumentedTransport, MonitorConfig};
