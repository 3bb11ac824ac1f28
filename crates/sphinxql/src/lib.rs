//! # sphinxql
//!
//! A client-side SphinxQL statement builder.
//!
//! ## Features
//!
//! - **One statement at a time**: chain configuration, `compile()` or `execute()`, and the
//!   builder is ready for the next statement
//! - **Escaping built in**: literal values and full-text terms are escaped by their own rules,
//!   field names are sanitized
//! - **Safe defaults**: SELECT and DELETE require a WHERE/MATCH condition
//! - **Result shaping**: records, a single column, or key to value pairs, decided from the field
//!   declaration
//! - **Bring your own connection**: anything implementing [`Transport`] can run statements
//! - **Execution monitoring**: timing, `tracing` output and a bounded execution log via
//!   [`InstrumentedTransport`]
//!
//! ## Example
//!
//! ```ignore
//! use sphinxql::prelude::*;
//!
//! let mut qb = QueryBuilder::new();
//!
//! // SELECT id, title, WEIGHT() AS weight FROM products
//! //   WHERE MATCH('@title "red" | "blue"') AND price BETWEEN 10 AND 90 LIMIT 0, 20 ...
//! let rows = qb
//!     .select_from("products", "id, title")?
//!     .search("@title", ["red", "blue"])?
//!     .between("price", 10, 90)?
//!     .execute(&conn)?;
//!
//! // id -> title
//! let titles = qb
//!     .select_from("products", ["id", "title"])?
//!     .in_set("id", [1, 2, 3])?
//!     .pairs(true)
//!     .execute(&conn)?
//!     .into_pairs();
//!
//! qb.insert_into("products", ["id", "title"])?
//!     .values([Value::from(4), Value::from("green")])?
//!     .execute(&conn)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod escape;
pub mod monitor;
pub mod options;
pub mod predicate;
pub mod prelude;
pub mod row;
pub mod shape;
pub mod statement;
pub mod transport;
pub mod value;

pub use builder::{QueryBuilder, raw_query};
pub use config::{BuilderDefaults, Config};
pub use error::{QlError, QlResult};
pub use escape::{MatchMode, escape_literal, escape_match_term, sanitize_field};
pub use monitor::{
    CompositeMonitor, ExecutionLog, InstrumentedTransport, LoggingMonitor, MonitorConfig,
    NoopMonitor, QueryContext, QueryMonitor, QueryResult, StatEntry,
};
pub use options::{Direction, QueryOptions};
pub use predicate::{CmpOp, Predicate, PredicateList};
pub use row::Row;
pub use shape::{Output, Pairs};
pub use statement::{FieldSpec, ShapeHint, Statement, StatementKind};
pub use transport::{Transport, TransportError};
pub use value::{FilterValue, Value};
