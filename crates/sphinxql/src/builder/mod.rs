//! The statement builder.
//!
//! A [`QueryBuilder`] accumulates one statement at a time: kind, target index,
//! fields, predicates, options and (for INSERT/REPLACE) value rows. `compile()`
//! turns that into a [`Statement`] and resets the builder so the same instance
//! can assemble the next one.
//!
//! ```rust,ignore
//! let mut qb = QueryBuilder::new();
//! let products = qb
//!     .select_from("products", "*")?
//!     .search("@title", ["red shoes"])?
//!     .gt("price", 10)?
//!     .between("weight", 10, 90)?
//!     .order_by_desc("weight")?
//!     .limit(0, 50)
//!     .execute(&conn)?;
//! ```

use crate::config::{BuilderDefaults, Config};
use crate::error::{QlError, QlResult};
use crate::escape::{MatchMode, check_index, escape_literal, sanitize_field};
use crate::options::{Direction, QueryOptions};
use crate::predicate::{CmpOp, PredicateList};
use crate::row::Row;
use crate::shape::Output;
use crate::statement::{FieldSpec, ShapeHint, Statement, StatementKind};
use crate::transport::Transport;
use crate::value::{FilterValue, Value};
use serde::de::DeserializeOwned;


/// Fluent, reusable SphinxQL statement builder.
///
/// Configuration methods take `&mut self` and return the builder for chaining;
/// the ones that validate their input return `QlResult<&mut Self>`.
/// A builder is not synchronized; share it across threads only behind a lock.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    defaults: BuilderDefaults,
    kind: Option<StatementKind>,
    index: String,
    fields: FieldSpec,
    predicates: PredicateList,
    options: QueryOptions,
    rows: Vec<Vec<Value>>,
}

impl QueryBuilder {
    /// Create a builder with the standard defaults (offset 0, limit 20, max_matches 1000).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose options reset to `defaults`.
    pub fn with_defaults(defaults: BuilderDefaults) -> Self {
        Self {
            defaults,
            options: QueryOptions::from_defaults(&defaults),
            ..Self::default()
        }
    }

    /// Create a builder from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_defaults(config.defaults)
    }

    // ==================== Statement kind ====================

    /// Start a SELECT on `index` projecting `fields`.
    ///
    /// `fields` is `*`, a single expression, or a column list; a two-column list
    /// can be shaped into pairs with [`pairs`](Self::pairs).
    pub fn select_from(
        &mut self,
        index: &str,
        fields: impl Into<FieldSpec>,
    ) -> QlResult<&mut Self> {
        let fields = fields.into();
        if fields.is_empty() {
            return Err(QlError::EmptyFields(StatementKind::Select));
        }
        self.start(StatementKind::Select, index, fields)
    }

    /// Start an INSERT into `index` with the given columns.
    pub fn insert_into(
        &mut self,
        index: &str,
        columns: impl Into<FieldSpec>,
    ) -> QlResult<&mut Self> {
        self.start_write(StatementKind::Insert, index, columns.into())
    }

    /// Start a REPLACE into `index` with the given columns.
    pub fn replace_into(
        &mut self,
        index: &str,
        columns: impl Into<FieldSpec>,
    ) -> QlResult<&mut Self> {
        self.start_write(StatementKind::Replace, index, columns.into())
    }

    /// Start a DELETE from `index`.
    pub fn delete_from(&mut self, index: &str) -> QlResult<&mut Self> {
        self.start(StatementKind::Delete, index, FieldSpec::default())
    }

    fn start_write(
        &mut self,
        kind: StatementKind,
        index: &str,
        columns: FieldSpec,
    ) -> QlResult<&mut Self> {
        if columns.is_empty() {
            return Err(QlError::EmptyFields(kind));
        }
        let columns = columns
            .names()
            .into_iter()
            .map(sanitize_field)
            .collect::<QlResult<Vec<_>>>()?;
        self.start(kind, index, FieldSpec::Columns(columns))
    }

    fn start(
        &mut self,
        kind: StatementKind,
        index: &str,
        fields: FieldSpec,
    ) -> QlResult<&mut Self> {
        self.index = check_index(index)?;
        self.kind = Some(kind);
        self.fields = fields;
        Ok(self)
    }

    // ==================== Conditions ====================

    /// Add `field op value`.
    ///
    /// A list value with `Eq`/`In` becomes `field IN (...)`, with `Ne` it becomes
    /// `field NOT IN (...)`.
    pub fn filter(
        &mut self,
        field: &str,
        op: CmpOp,
        value: impl Into<FilterValue>,
    ) -> QlResult<&mut Self> {
        self.predicates.add_comparison(field, op, value)?;
        Ok(self)
    }

    /// Add `field = value`.
    pub fn eq(&mut self, field: &str, value: impl Into<FilterValue>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Eq, value)
    }

    /// Add `field != value`.
    pub fn ne(&mut self, field: &str, value: impl Into<FilterValue>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Ne, value)
    }

    /// Add `field > value`.
    pub fn gt(&mut self, field: &str, value: impl Into<Value>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Gt, value.into())
    }

    /// Add `field >= value`.
    pub fn gte(&mut self, field: &str, value: impl Into<Value>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Gte, value.into())
    }

    /// Add `field < value`.
    pub fn lt(&mut self, field: &str, value: impl Into<Value>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Lt, value.into())
    }

    /// Add `field <= value`.
    pub fn lte(&mut self, field: &str, value: impl Into<Value>) -> QlResult<&mut Self> {
        self.filter(field, CmpOp::Lte, value.into())
    }

    /// Add `field BETWEEN min AND max`; fails with [`QlError::InvalidRange`] unless `min < max`.
    pub fn between(
        &mut self,
        field: &str,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> QlResult<&mut Self> {
        self.predicates.add_between(field, min, max)?;
        Ok(self)
    }

    /// Add `field IN (values...)`.
    pub fn in_set<I, V>(&mut self, field: &str, values: I) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicates.add_set_membership(field, values)?;
        Ok(self)
    }

    /// Add `field NOT IN (values...)`.
    pub fn not_in<I, V>(&mut self, field: &str, values: I) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicates.add_set_exclusion(field, values)?;
        Ok(self)
    }

    /// Search `terms` in a full-text field expression, loosely.
    ///
    /// Terms are OR-ed: `search("@title", ["foo", "bar"])` renders
    /// `@title "foo" | "bar"` inside the `MATCH` clause.
    pub fn search<I, S>(&mut self, field: &str, terms: I) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_with(field, terms, MatchMode::Loose)
    }

    /// Search `terms` in a full-text field expression with the given mode.
    pub fn search_with<I, S>(
        &mut self,
        field: &str,
        terms: I,
        mode: MatchMode,
    ) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.add_match(field, terms, mode)?;
        Ok(self)
    }

    /// Search `terms` across every full-text field.
    pub fn search_all<I, S>(&mut self, terms: I, mode: MatchMode) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.add_match_all(terms, mode)?;
        Ok(self)
    }

    /// Check if any WHERE/MATCH condition has been added.
    pub fn has_predicates(&self) -> bool {
        !self.predicates.is_empty()
    }

    /// The accumulated predicates.
    pub fn predicates(&self) -> &PredicateList {
        &self.predicates
    }

    // ==================== Grouping, ordering & pagination ====================

    /// Set the GROUP BY column (overwrites).
    pub fn group_by(&mut self, field: &str) -> QlResult<&mut Self> {
        self.options.group_by = Some(sanitize_field(field)?);
        Ok(self)
    }

    /// Set the ORDER BY column and direction (overwrites).
    pub fn order_by(&mut self, field: &str, direction: Direction) -> QlResult<&mut Self> {
        self.options.order_by = Some((sanitize_field(field)?, direction));
        Ok(self)
    }

    /// Set ORDER BY `field` DESC.
    pub fn order_by_desc(&mut self, field: &str) -> QlResult<&mut Self> {
        self.order_by(field, Direction::Desc)
    }

    /// Set the LIMIT offset and row count.
    pub fn limit(&mut self, offset: u64, limit: u64) -> &mut Self {
        self.options.offset = offset;
        self.options.limit = limit;
        self
    }

    /// Return the first `limit` rows.
    pub fn take(&mut self, limit: u64) -> &mut Self {
        self.limit(0, limit)
    }

    /// Set `OPTION max_matches`.
    pub fn max_matches(&mut self, cap: u64) -> &mut Self {
        self.options.max_matches = cap;
        self
    }

    /// Shape a two-column SELECT as a key to value mapping.
    pub fn pairs(&mut self, enabled: bool) -> &mut Self {
        self.options.pairs = enabled;
        self
    }

    /// The current options.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    // ==================== Values ====================

    /// Add one row of values for INSERT/REPLACE.
    ///
    /// Call repeatedly to write several rows in one statement. Arity is checked
    /// against the column list at compile time.
    pub fn values<I, V>(&mut self, row: I) -> QlResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let row: Vec<Value> = row.into_iter().map(Into::into).collect();
        if row.is_empty() {
            return Err(QlError::empty_values("values row is empty"));
        }
        self.rows.push(row);
        Ok(self)
    }

    // ==================== Compile & execute ====================

    /// Clear everything and restore the option defaults.
    pub fn reset(&mut self) -> &mut Self {
        self.kind = None;
        self.index.clear();
        self.fields = FieldSpec::default();
        self.predicates.clear();
        self.options = QueryOptions::from_defaults(&self.defaults);
        self.rows.clear();
        self
    }

    /// Compile the configured statement.
    ///
    /// On success the builder is reset. On a validation error nothing is
    /// produced and the configuration is left as it was.
    pub fn compile(&mut self) -> QlResult<Statement> {
        let kind = self.kind.ok_or(QlError::NoStatement)?;
        if self.index.is_empty() {
            return Err(QlError::EmptyIndex);
        }

        let (sql, shape) = match kind {
            StatementKind::Select => (
                self.select_sql()?,
                ShapeHint::for_select(&self.fields, self.options.pairs),
            ),
            StatementKind::Insert | StatementKind::Replace => {
                (self.write_sql(kind)?, ShapeHint::Affected)
            }
            StatementKind::Delete => (self.delete_sql()?, ShapeHint::Affected),
        };

        tracing::debug!(
            target: "sphinxql.sql",
            kind = kind.keyword(),
            sql = %sql,
            "compiled statement"
        );
        let statement = Statement::new(kind, std::mem::take(&mut self.index), sql, shape);
        self.reset();
        Ok(statement)
    }

    /// Compile, send once, and shape the result.
    ///
    /// The builder is reset whether or not the transport succeeds.
    pub fn execute<T: Transport + ?Sized>(&mut self, transport: &T) -> QlResult<Output> {
        self.compile()?.run(transport)
    }

    /// Compile a SELECT, send it, and deserialize every row into `T`.
    pub fn fetch_as<D, T>(&mut self, transport: &T) -> QlResult<Vec<D>>
    where
        D: DeserializeOwned,
        T: Transport + ?Sized,
    {
        if let Some(kind) = self.kind.filter(|k| k.is_mutation()) {
            return Err(QlError::Decode(format!("{kind} returns no rows to decode")));
        }
        let statement = self.compile()?;
        let rows = transport
            .query(statement.sql())
            .map_err(|e| QlError::transport(e.to_string(), statement.sql()))?;
        rows.iter().map(Row::deserialize).collect()
    }

    fn condition_sql(&self, kind: StatementKind) -> QlResult<String> {
        let condition = self.predicates.render();
        if condition.is_empty() {
            return Err(QlError::EmptyPredicates {
                kind,
                index: self.index.clone(),
            });
        }
        Ok(condition)
    }

    fn select_sql(&self) -> QlResult<String> {
        if self.fields.is_empty() {
            return Err(QlError::EmptyFields(StatementKind::Select));
        }
        let condition = self.condition_sql(StatementKind::Select)?;
        Ok(format!(
            "SELECT {}, WEIGHT() AS weight FROM {} WHERE {}{}{}",
            self.fields.to_sql(),
            self.index,
            condition,
            self.options.group_order_sql(),
            self.options.limit_sql()
        ))
    }

    fn write_sql(&self, kind: StatementKind) -> QlResult<String> {
        if self.fields.is_empty() {
            return Err(QlError::EmptyFields(kind));
        }
        if self.rows.is_empty() {
            return Err(QlError::empty_values(format!(
                "{kind} into '{}' has no values",
                self.index
            )));
        }

        let columns = self.fields.arity();
        let mut tuples = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.len() != columns {
                return Err(QlError::ArityMismatch {
                    columns,
                    column_list: self.fields.to_sql(),
                    values: row.len(),
                });
            }
            let escaped: Vec<String> = row.iter().map(escape_literal).collect();
            tuples.push(format!("({})", escaped.join(", ")));
        }

        if self.has_predicates() {
            tracing::warn!(
                target: "sphinxql.sql",
                kind = kind.keyword(),
                index = %self.index,
                predicates = self.predicates.len(),
                "conditions are ignored for {kind}"
            );
        }

        Ok(format!(
            "{} INTO {} ({}) VALUES {}",
            kind.keyword(),
            self.index,
            self.fields.to_sql(),
            tuples.join(", ")
        ))
    }

    fn delete_sql(&self) -> QlResult<String> {
        let condition = self.condition_sql(StatementKind::Delete)?;
        Ok(format!("DELETE FROM {} WHERE {}", self.index, condition))
    }
}

/// Send arbitrary statement text once and return the rows unshaped.
///
/// Failures carry the statement text, like compiled statements do.
pub fn raw_query<T: Transport + ?Sized>(transport: &T, sql: &str) -> QlResult<Vec<Row>> {
    tracing::debug!(target: "sphinxql.sql", sql, "raw query");
    transport
        .query(sql)
        .map_err(|e| QlError::transport(e.to_string(), sql))
}
